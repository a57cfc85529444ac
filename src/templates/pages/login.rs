use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn login_page(username: &str, error: Option<&str>) -> Markup {
    desktop_layout(
        "Sign in",
        false,
        html! {
            main class="container narrow" {
                h1 { "Sign in" }
                p class="lead" { "Use the credentials your team shared with you." }

                form method="post" action="/login" class="login-form" {
                    label for="username" { "Username" }
                    input type="text" id="username" name="username" value=(username) autocomplete="username";

                    label for="password" { "Password" }
                    input type="password" id="password" name="password" autocomplete="current-password";

                    @if let Some(msg) = error {
                        p class="error" role="alert" { (msg) }
                    }

                    button type="submit" class="primary" { "Sign in" }
                }
            }
        },
    )
}
