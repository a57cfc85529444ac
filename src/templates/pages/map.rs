use crate::errors::ServerError;
use crate::pipeline::{AppliedView, Group, MapSession};
use crate::templates::components::filter_drawer;
use crate::templates::desktop_layout;
use maud::{html, Markup, PreEscaped};
use serde::Serialize;

/// Body of `GET /map/groups` and the data embedded in the map page.
#[derive(Debug, Serialize)]
pub struct GroupFeed<'a> {
    pub version: u64,
    pub center: (f64, f64),
    pub groups: &'a [Group],
}

impl<'a> GroupFeed<'a> {
    pub fn new(view: &'a AppliedView, center: (f64, f64)) -> Self {
        Self {
            version: view.version,
            center,
            groups: &view.groups,
        }
    }
}

pub struct MapPageVm<'a> {
    pub username: &'a str,
    pub center: (f64, f64),
    /// `None` while no dataset has been installed yet.
    pub map: Option<&'a MapSession>,
    /// Most recent load failure; shown even when an older dataset is still served.
    pub load_error: Option<&'a str>,
    pub loading: bool,
}

// Runs both on a full page load and after the loading poll swaps this markup
// in, when DOMContentLoaded has already fired. Leaflet is deferred, so wait for `L`.
const MAP_SCRIPT: &str = r#"
(function () {
  function init() {
    var el = document.getElementById('map');
    if (!el || el.dataset.ready) { return; }
    if (typeof L === 'undefined') { setTimeout(init, 50); return; }
    el.dataset.ready = '1';
    var data = JSON.parse(document.getElementById('groups-data').textContent);
    var map = L.map(el).setView(data.center, 12);
    L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
      attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);
    var pins = typeof L.markerClusterGroup === 'function' ? L.markerClusterGroup() : L.layerGroup();
    data.groups.forEach(function (g, i) {
      L.marker([g.lat, g.lng])
        .bindTooltip(g.members.length + (g.members.length === 1 ? ' listing' : ' listings'))
        .on('click', function () { htmx.ajax('GET', '/map/groups/' + i, { target: '#group-detail', swap: 'outerHTML' }); })
        .addTo(pins);
    });
    pins.addTo(map);
  }
  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', init);
  } else {
    init();
  }
})();
"#;

pub fn map_page(vm: &MapPageVm) -> Result<Markup, ServerError> {
    let content = match vm.map {
        Some(map) => ready(vm, map)?,
        None => pending(vm),
    };
    Ok(desktop_layout("Listing Map", true, content))
}

fn ready(vm: &MapPageVm, map: &MapSession) -> Result<Markup, ServerError> {
    let view = map.applied();
    let feed = serde_json::to_string(&GroupFeed::new(&view, vm.center))
        .map_err(|_| ServerError::InternalError)?;

    Ok(html! {
        main id="map-main" class="container wide" {
            (status_bar(vm))
            div class="map-layout" {
                (filter_drawer(map))
                div class="map-column" {
                    div id="map" style="height: 60vh;" {}
                    div id="group-detail" {}
                }
                section class="card group-list" {
                    h3 { "Locations" }
                    @if view.groups.is_empty() {
                        p class="microcopy" { "No listings match the applied filters." }
                    }
                    ol {
                        @for (i, group) in view.groups.iter().enumerate() {
                            li {
                                a
                                    href=(format!("/map/groups/{i}"))
                                    hx-get=(format!("/map/groups/{i}"))
                                    hx-target="#group-detail"
                                    hx-swap="outerHTML"
                                {
                                    (group.lat) ", " (group.lng)
                                }
                                " (" (group.members.len()) ")"
                            }
                        }
                    }
                }
            }
            script type="application/json" id="groups-data" { (PreEscaped(embed_json(&feed))) }
            script { (PreEscaped(MAP_SCRIPT)) }
        }
    })
}

fn pending(vm: &MapPageVm) -> Markup {
    html! {
        main id="map-main" class="container" {
            (status_bar(vm))
            @if vm.loading || vm.load_error.is_none() {
                p class="lead" { "Loading listings…" }
                div
                    hx-get="/map"
                    hx-trigger="load delay:2s"
                    hx-select="#map-main"
                    hx-target="#map-main"
                    hx-swap="outerHTML"
                {}
            }
        }
    }
}

fn status_bar(vm: &MapPageVm) -> Markup {
    html! {
        div class="status-bar" {
            span { "Signed in as " strong { (vm.username) } }
            @if let Some(err) = vm.load_error {
                p class="error" role="alert" { "Could not load listings: " (err) }
            }
            @if vm.loading && vm.map.is_some() {
                span class="microcopy" { "Refreshing listings…" }
            }
            form method="post" action="/dataset/reload" {
                button type="submit" disabled[vm.loading] { "Reload listings" }
            }
        }
    }
}

/// JSON is placed inside a `<script>` element; `</` must not close it early.
fn embed_json(json: &str) -> String {
    json.replace("</", "<\\/")
}
