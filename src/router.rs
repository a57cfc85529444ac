use crate::app::AppState;
use crate::auth::sessions::{create_session, load_session_user, revoke_session};
use crate::errors::ServerError;
use crate::pipeline::MapSession;
use crate::responses::{
    clear_session_cookie, html_response, json_response, redirect, redirect_with_cookie,
    session_cookie, session_token, ResultResp,
};
use crate::templates::components::{filter_drawer, group_detail};
use crate::templates::pages::{login_page, map_page, GroupFeed, MapPageVm};
use astra::Request;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, info};

/// A request carrying a live session cookie.
struct SignedIn {
    token: String,
    username: String,
}

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();
    debug!(%method, %path, "request");

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => redirect("/map"),
        ("GET", "/login") => html_response(login_page("", None)),
        ("POST", "/login") => login(req, state),
        ("POST", "/logout") => logout(&req, state),

        _ if is_protected(&path) => match current_user(&req, state)? {
            Some(user) => protected(req, state, &method, &path, user),
            None if is_page(&req, &path) => redirect("/login"),
            None => Err(ServerError::Unauthorized("Please sign in".into())),
        },

        _ => Err(ServerError::NotFound),
    }
}

fn protected(
    req: Request,
    state: &AppState,
    method: &str,
    path: &str,
    user: SignedIn,
) -> ResultResp {
    match (method, path) {
        ("GET", "/map") => map(state, &user),
        ("GET", "/map/groups") => state.with_map(&user.token, |m| {
            json_response(&GroupFeed::new(&m.applied(), state.map_center))
        }),
        ("GET", p) if p.starts_with("/map/groups/") => {
            let index: usize = p["/map/groups/".len()..]
                .parse()
                .map_err(|_| ServerError::NotFound)?;
            state.with_map(&user.token, |m| {
                let group = m.group(index).ok_or(ServerError::NotFound)?;
                html_response(group_detail(index, group))
            })
        }

        ("POST", "/filters/apply") => {
            state.with_map(&user.token, |m| {
                m.apply();
                Ok(())
            })?;
            redirect("/map")
        }
        ("POST", p) if p.starts_with("/filters/") => {
            let form = read_form(req)?;
            state.with_map(&user.token, |m| {
                match p {
                    "/filters/toggle" => m.toggle_option(field(&form)?, required(&form, "option")?)?,
                    "/filters/select-all" => m.select_all(field(&form)?)?,
                    "/filters/clear" => m.clear_all(field(&form)?)?,
                    "/filters/select" => {
                        let option = form.get("option").map(String::as_str).filter(|o| !o.is_empty());
                        m.set_selected(field(&form)?, option)?
                    }
                    "/filters/price" => {
                        let lo = bound(&form, "lo")?;
                        let hi = bound(&form, "hi")?;
                        m.set_price_bounds(lo, hi)
                    }
                    "/filters/cutoff" => m.set_date_cutoff(cutoff(&form)?),
                    _ => return Err(ServerError::NotFound),
                }
                html_response(filter_drawer(m))
            })
        }

        ("POST", "/dataset/reload") => {
            let generation = state.loader.reload();
            info!(generation, username = %user.username, "dataset reload requested");
            redirect("/map")
        }

        _ => Err(ServerError::NotFound),
    }
}

fn map(state: &AppState, user: &SignedIn) -> ResultResp {
    let status = state.loader.status();
    let render = |map: Option<&MapSession>| -> ResultResp {
        let vm = MapPageVm {
            username: &user.username,
            center: state.map_center,
            map,
            load_error: status.error.as_deref(),
            loading: status.in_flight.is_some(),
        };
        html_response(map_page(&vm)?)
    };

    if status.dataset.is_none() {
        return render(None);
    }
    state.with_map(&user.token, |m| render(Some(&*m)))
}

fn login(req: Request, state: &AppState) -> ResultResp {
    let form = read_form(req)?;
    let username = form.get("username").map(String::as_str).unwrap_or("");
    let password = form.get("password").map(String::as_str).unwrap_or("");

    match state.credentials.verify(username, password) {
        Ok(true) => {
            let now = now_unix();
            let token = state
                .db
                .with_conn(|conn| create_session(conn, username, now, state.session_ttl_secs))?;
            redirect_with_cookie("/map", &session_cookie(&token, state.session_ttl_secs))
        }
        Ok(false) => html_response(login_page(username, Some("Invalid username or password"))),
        Err(ServerError::BadRequest(msg)) => html_response(login_page(username, Some(&msg))),
        Err(ServerError::Unavailable(msg)) => html_response(login_page(
            username,
            Some(&format!("Could not check credentials: {msg}")),
        )),
        Err(e) => Err(e),
    }
}

fn logout(req: &Request, state: &AppState) -> ResultResp {
    if let Some(token) = session_token(req) {
        let now = now_unix();
        state.db.with_conn(|conn| revoke_session(conn, &token, now))?;
        state.drop_map(&token);
    }
    redirect_with_cookie("/login", &clear_session_cookie())
}

fn current_user(req: &Request, state: &AppState) -> Result<Option<SignedIn>, ServerError> {
    let Some(token) = session_token(req) else {
        return Ok(None);
    };
    let now = now_unix();
    let username = state
        .db
        .with_conn(|conn| load_session_user(conn, &token, now))?;
    Ok(username.map(|username| SignedIn { token, username }))
}

fn is_protected(path: &str) -> bool {
    ["/map", "/filters", "/dataset"]
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")))
}

/// Full-page navigations get a login redirect; htmx and JSON calls get a 401.
fn is_page(req: &Request, path: &str) -> bool {
    req.headers().get("HX-Request").is_none()
        && matches!(path, "/map" | "/filters/apply" | "/dataset/reload")
}

fn read_form(req: Request) -> Result<HashMap<String, String>, ServerError> {
    let mut body = String::new();
    req.into_body()
        .reader()
        .read_to_string(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("Unreadable request body: {e}")))?;

    Ok(url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect())
}

fn required<'a>(form: &'a HashMap<String, String>, key: &str) -> Result<&'a str, ServerError> {
    form.get(key)
        .map(String::as_str)
        .ok_or_else(|| ServerError::BadRequest(format!("Missing '{key}'")))
}

fn field(form: &HashMap<String, String>) -> Result<&str, ServerError> {
    required(form, "field")
}

fn bound(form: &HashMap<String, String>, key: &str) -> Result<f64, ServerError> {
    let raw = required(form, key)?.trim();
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ServerError::BadRequest(format!("'{key}' must be a number, got '{raw}'")))
}

fn cutoff(form: &HashMap<String, String>) -> Result<Option<NaiveDate>, ServerError> {
    match form.get("cutoff").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("Invalid date '{raw}'"))),
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
