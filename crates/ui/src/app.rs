use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::FormPage;

#[component]
pub fn App() -> Element {
    let ctx = use_context::<AppContext>();
    let title = ctx.title().to_owned();

    rsx! {
        document::Stylesheet { href: asset!("/assets/form.css") }

        document::Title { "{title}" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                main { class: "app-main",
                    h1 { class: "app-title", "{title}" }
                    FormPage {}
                }
            }
        }
    }
}
