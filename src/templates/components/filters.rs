use crate::pipeline::{DateCutoff, FacetDefinition, MapSession, Selection};
use maud::{html, Markup};
use serde_json::json;

/// Draft filter controls. Every control posts to `/filters/*` and swaps the
/// whole drawer; nothing on the map changes until Apply.
pub fn filter_drawer(map: &MapSession) -> Markup {
    let config = map.pipeline().config();
    let range = map.price_range();
    let applied = map.applied();

    html! {
        aside id="filter-drawer" class="card filter-drawer" {
            h3 { "Filters" }
            p class="microcopy" {
                "Showing " (applied.filtered) " of " (map.dataset().len())
                " listings at " (applied.groups.len()) " locations"
            }

            @for facet in map.facets().iter() {
                (facet_control(facet))
            }

            fieldset {
                legend { (config.price_column) }
                form
                    hx-post="/filters/price"
                    hx-target="#filter-drawer"
                    hx-swap="outerHTML"
                    hx-trigger="change"
                {
                    label { "Min " input type="number" name="lo" step="any" value=(range.lo); }
                    label { "Max " input type="number" name="hi" step="any" value=(range.hi); }
                }
            }

            @if config.date_cutoff == DateCutoff::Enabled {
                fieldset {
                    legend { "Possession by" }
                    form
                        hx-post="/filters/cutoff"
                        hx-target="#filter-drawer"
                        hx-swap="outerHTML"
                        hx-trigger="change"
                    {
                        input
                            type="date"
                            name="cutoff"
                            value=(map.date_cutoff().map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default());
                    }
                }
            }

            form method="post" action="/filters/apply" {
                button type="submit" class="primary" { "Apply" }
            }
        }
    }
}

fn facet_control(facet: &FacetDefinition) -> Markup {
    match &facet.selected {
        Selection::Multi(_) => multi_control(facet),
        Selection::Single(current) => single_control(facet, current.as_deref()),
    }
}

fn multi_control(facet: &FacetDefinition) -> Markup {
    let field_vals = json!({ "field": facet.field }).to_string();

    html! {
        fieldset {
            legend { (facet.field) }
            div class="facet-actions" {
                button
                    type="button"
                    hx-post="/filters/select-all"
                    hx-vals=(field_vals)
                    hx-target="#filter-drawer"
                    hx-swap="outerHTML"
                { "All" }
                button
                    type="button"
                    hx-post="/filters/clear"
                    hx-vals=(field_vals)
                    hx-target="#filter-drawer"
                    hx-swap="outerHTML"
                { "Clear" }
            }
            @for option in &facet.options {
                label class="facet-option" {
                    input
                        type="checkbox"
                        checked[facet.selected.contains(option)]
                        hx-post="/filters/toggle"
                        hx-vals=(json!({ "field": facet.field, "option": option }).to_string())
                        hx-target="#filter-drawer"
                        hx-swap="outerHTML";
                    " " (option)
                }
            }
        }
    }
}

fn single_control(facet: &FacetDefinition, current: Option<&str>) -> Markup {
    html! {
        fieldset {
            legend { (facet.field) }
            select
                name="option"
                hx-post="/filters/select"
                hx-vals=(json!({ "field": facet.field }).to_string())
                hx-trigger="change"
                hx-target="#filter-drawer"
                hx-swap="outerHTML"
            {
                option value="" selected[current.is_none()] { "Any" }
                @for option in &facet.options {
                    option value=(option) selected[current == Some(option.as_str())] { (option) }
                }
            }
        }
    }
}
