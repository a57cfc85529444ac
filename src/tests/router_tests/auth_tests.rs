use crate::errors::ServerError;
use crate::pipeline::PipelineConfig;
use crate::router::handle;
use crate::tests::utils::{body_string, get, header, login, post_form, test_state};

#[test]
fn login_page_loads_successfully() {
    let state = test_state(PipelineConfig::basic());

    let resp = handle(get("/login", None), &state).expect("Failed to handle request");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Sign in"));
    assert!(body.contains("name=\"username\""));
    assert!(body.contains("name=\"password\""));
}

#[test]
fn valid_login_sets_cookie_and_redirects_to_map() {
    let state = test_state(PipelineConfig::basic());

    let resp = handle(
        post_form("/login", None, "username=broker&password=s3cret"),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 302);
    assert_eq!(header(&resp, "Location"), "/map");
    let cookie = header(&resp, "Set-Cookie");
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
}

#[test]
fn wrong_password_rerenders_form() {
    let state = test_state(PipelineConfig::basic());

    let resp = handle(
        post_form("/login", None, "username=broker&password=nope"),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(header(&resp, "Set-Cookie").is_empty());
    let body = body_string(resp);
    assert!(body.contains("Invalid username or password"));
    // Username is kept, password is not echoed back.
    assert!(body.contains("value=\"broker\""));
    assert!(!body.contains("nope"));
}

#[test]
fn blank_fields_ask_for_both() {
    let state = test_state(PipelineConfig::basic());

    let resp = handle(post_form("/login", None, "username=broker&password="), &state).unwrap();
    assert!(body_string(resp).contains("Please enter both username and password"));
}

#[test]
fn map_page_without_session_redirects_to_login() {
    let state = test_state(PipelineConfig::basic());

    let resp = handle(get("/map", None), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(header(&resp, "Location"), "/login");

    let resp = handle(get("/map", Some("forged-token")), &state).unwrap();
    assert_eq!(header(&resp, "Location"), "/login");
}

#[test]
fn partials_without_session_are_unauthorized() {
    let state = test_state(PipelineConfig::basic());

    assert!(matches!(
        handle(get("/map/groups", None), &state),
        Err(ServerError::Unauthorized(_))
    ));
    assert!(matches!(
        handle(post_form("/filters/toggle", None, "field=Area&option=Bopal"), &state),
        Err(ServerError::Unauthorized(_))
    ));
}

#[test]
fn logout_revokes_the_session() {
    let state = test_state(PipelineConfig::basic());
    let token = login(&state);

    let resp = handle(get("/map", Some(&token)), &state).unwrap();
    assert_eq!(resp.status(), 200);

    let resp = handle(post_form("/logout", Some(&token), ""), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(header(&resp, "Location"), "/login");
    assert!(header(&resp, "Set-Cookie").contains("Max-Age=0"));

    let resp = handle(get("/map", Some(&token)), &state).unwrap();
    assert_eq!(header(&resp, "Location"), "/login");
}

#[test]
fn unknown_route_is_not_found() {
    let state = test_state(PipelineConfig::basic());
    assert!(matches!(
        handle(get("/admin", None), &state),
        Err(ServerError::NotFound)
    ));
}
