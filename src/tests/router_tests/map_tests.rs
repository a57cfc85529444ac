use crate::errors::ServerError;
use crate::pipeline::PipelineConfig;
use crate::router::handle;
use crate::tests::utils::{body_string, feed, get, header, login, post_form, test_state, unloaded_state};

#[test]
fn map_page_lists_groups_and_embeds_the_feed() {
    let state = test_state(PipelineConfig::extended());
    let token = login(&state);

    let resp = handle(get("/map", Some(&token)), &state).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Signed in as"));
    assert!(body.contains("broker"));
    assert!(body.contains("id=\"groups-data\""));
    assert!(body.contains("/map/groups/1"));
    assert!(body.contains("id=\"filter-drawer\""));
}

#[test]
fn feed_groups_by_exact_coordinates() {
    let state = test_state(PipelineConfig::extended());
    let token = login(&state);

    let feed = feed(&state, &token);
    assert_eq!(feed["version"], 1);
    assert_eq!(feed["center"], serde_json::json!([23.0225, 72.5714]));

    let groups = feed["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["key"], "23.01_72.5");
    assert_eq!(groups[0]["lat"], 23.01);
    assert_eq!(groups[0]["members"].as_array().unwrap().len(), 2);
    // Forward-filled from the row above.
    assert_eq!(groups[0]["members"][1]["Area"], "Bopal");
    assert_eq!(groups[1]["key"], "23.05_72.6");
}

#[test]
fn basic_variant_drops_range_prices() {
    let state = test_state(PipelineConfig::basic());
    let token = login(&state);

    let feed = feed(&state, &token);
    let groups = feed["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["members"].as_array().unwrap().len(), 1);
    assert_eq!(groups[0]["members"][0]["Price (₹)"], "80");
}

#[test]
fn group_detail_omits_position_fields() {
    let state = test_state(PipelineConfig::extended());
    let token = login(&state);

    let resp = handle(get("/map/groups/0", Some(&token)), &state).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Skyline"));
    assert!(body.contains("Bopal"));
    assert!(body.contains("2 listings"));
    assert!(!body.contains("Latitude"));
    assert!(!body.contains("Longitude"));
    assert!(!body.contains("<html"));
}

#[test]
fn group_detail_out_of_range_is_not_found() {
    let state = test_state(PipelineConfig::extended());
    let token = login(&state);

    for uri in ["/map/groups/2", "/map/groups/x"] {
        assert!(
            matches!(handle(get(uri, Some(&token)), &state), Err(ServerError::NotFound)),
            "{uri}"
        );
    }
}

#[test]
fn map_shows_loading_state_before_first_load() {
    let state = unloaded_state(PipelineConfig::basic());
    let token = login(&state);

    let resp = handle(get("/map", Some(&token)), &state).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("Loading listings"));

    assert!(matches!(
        handle(get("/map/groups", Some(&token)), &state),
        Err(ServerError::Unavailable(_))
    ));
}

#[test]
fn reload_redirects_back_to_map() {
    let state = test_state(PipelineConfig::basic());
    let token = login(&state);

    let resp = handle(post_form("/dataset/reload", Some(&token), ""), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(header(&resp, "Location"), "/map");
}
