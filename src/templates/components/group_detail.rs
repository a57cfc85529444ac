use crate::pipeline::Group;
use maud::{html, Markup};

/// Side panel for one pin: every listing at the location, position fields omitted.
pub fn group_detail(index: usize, group: &Group) -> Markup {
    html! {
        section class="card" id="group-detail" data-group=(index) {
            h3 { (group.lat) ", " (group.lng) }
            p class="microcopy" {
                (group.members.len())
                @if group.members.len() == 1 { " listing" } @else { " listings" }
            }
            @for member in &group.members {
                dl class="listing" {
                    @for (field, value) in member.detail_fields() {
                        dt { (field) }
                        dd { (value) }
                    }
                }
            }
        }
    }
}
