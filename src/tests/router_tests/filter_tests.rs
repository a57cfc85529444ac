use crate::errors::ServerError;
use crate::pipeline::{FacetMode, PipelineConfig};
use crate::router::handle;
use crate::tests::utils::{body_string, feed, header, login, post_form, test_state};

fn group_sizes(feed: &serde_json::Value) -> Vec<(String, usize)> {
    feed["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| {
            (
                g["key"].as_str().unwrap().to_string(),
                g["members"].as_array().unwrap().len(),
            )
        })
        .collect()
}

#[test]
fn toggle_only_takes_effect_after_apply() {
    let state = test_state(PipelineConfig::extended());
    let token = login(&state);

    let resp = handle(
        post_form("/filters/toggle", Some(&token), "field=Area&option=Thaltej"),
        &state,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);
    let drawer = body_string(resp);
    assert!(drawer.contains("id=\"filter-drawer\""));
    assert!(!drawer.contains("<html"));

    // Draft only: the map still shows version 1.
    let before = feed(&state, &token);
    assert_eq!(before["version"], 1);
    assert_eq!(group_sizes(&before).len(), 2);

    let resp = handle(post_form("/filters/apply", Some(&token), ""), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(header(&resp, "Location"), "/map");

    let after = feed(&state, &token);
    assert_eq!(after["version"], 2);
    assert_eq!(group_sizes(&after), vec![("23.05_72.6".to_string(), 1)]);
}

#[test]
fn select_all_and_clear_round_trip() {
    let state = test_state(PipelineConfig::extended());
    let token = login(&state);

    handle(post_form("/filters/select-all", Some(&token), "field=BHK"), &state).unwrap();
    handle(post_form("/filters/toggle", Some(&token), "field=BHK&option=2"), &state).unwrap();
    handle(post_form("/filters/apply", Some(&token), ""), &state).unwrap();
    assert_eq!(
        group_sizes(&feed(&state, &token)),
        vec![("23.01_72.5".to_string(), 1), ("23.05_72.6".to_string(), 1)]
    );

    handle(post_form("/filters/clear", Some(&token), "field=BHK"), &state).unwrap();
    handle(post_form("/filters/apply", Some(&token), ""), &state).unwrap();
    assert_eq!(
        group_sizes(&feed(&state, &token)),
        vec![("23.01_72.5".to_string(), 2), ("23.05_72.6".to_string(), 1)]
    );
}

#[test]
fn price_bounds_keep_overlapping_ranges() {
    let state = test_state(PipelineConfig::extended());
    let token = login(&state);

    handle(post_form("/filters/price", Some(&token), "lo=60&hi=90"), &state).unwrap();
    handle(post_form("/filters/apply", Some(&token), ""), &state).unwrap();

    assert_eq!(
        group_sizes(&feed(&state, &token)),
        vec![("23.01_72.5".to_string(), 2)]
    );
}

#[test]
fn non_numeric_price_bound_is_rejected() {
    let state = test_state(PipelineConfig::extended());
    let token = login(&state);

    assert!(matches!(
        handle(post_form("/filters/price", Some(&token), "lo=NaN&hi=90"), &state),
        Err(ServerError::BadRequest(_))
    ));
}

#[test]
fn possession_cutoff_excludes_later_dates() {
    let state = test_state(PipelineConfig::extended());
    let token = login(&state);

    handle(post_form("/filters/cutoff", Some(&token), "cutoff=2026-06-01"), &state).unwrap();
    handle(post_form("/filters/apply", Some(&token), ""), &state).unwrap();
    assert_eq!(
        group_sizes(&feed(&state, &token)),
        vec![("23.01_72.5".to_string(), 1), ("23.05_72.6".to_string(), 1)]
    );

    handle(post_form("/filters/cutoff", Some(&token), "cutoff="), &state).unwrap();
    handle(post_form("/filters/apply", Some(&token), ""), &state).unwrap();
    assert_eq!(group_sizes(&feed(&state, &token))[0].1, 2);
}

#[test]
fn unknown_option_is_a_bad_request() {
    let state = test_state(PipelineConfig::extended());
    let token = login(&state);

    assert!(matches!(
        handle(
            post_form("/filters/toggle", Some(&token), "field=Area&option=Nowhere"),
            &state
        ),
        Err(ServerError::BadRequest(_))
    ));
    assert!(matches!(
        handle(post_form("/filters/toggle", Some(&token), "field=Latitude&option=23.01"), &state),
        Err(ServerError::BadRequest(_))
    ));
}

#[test]
fn single_select_mode() {
    let mut cfg = PipelineConfig::extended();
    cfg.facet_mode = FacetMode::Single;
    let state = test_state(cfg);
    let token = login(&state);

    // Multi-select actions are refused.
    assert!(matches!(
        handle(
            post_form("/filters/toggle", Some(&token), "field=Area&option=Bopal"),
            &state
        ),
        Err(ServerError::BadRequest(_))
    ));

    let resp = handle(
        post_form("/filters/select", Some(&token), "field=Area&option=Bopal"),
        &state,
    )
    .unwrap();
    assert!(body_string(resp).contains("<select"));
    handle(post_form("/filters/apply", Some(&token), ""), &state).unwrap();
    assert_eq!(
        group_sizes(&feed(&state, &token)),
        vec![("23.01_72.5".to_string(), 2)]
    );

    // Empty option goes back to "Any".
    handle(post_form("/filters/select", Some(&token), "field=Area&option="), &state).unwrap();
    handle(post_form("/filters/apply", Some(&token), ""), &state).unwrap();
    assert_eq!(group_sizes(&feed(&state, &token)).len(), 2);
}
