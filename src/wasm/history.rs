//! `History` over the browser's history and location objects

use crate::routing::History;
use wasm_bindgen::JsValue;

fn failure_message(op: &str, err: &impl std::fmt::Debug) -> String {
    format!("{op} failed: {err:?}")
}

fn report(op: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        super::console_log(&failure_message(op, &e));
    }
}

pub struct BrowserHistory {
    window: web_sys::Window,
    hash_routing: bool,
}

impl BrowserHistory {
    /// `None` outside a window context (workers).
    pub fn new(hash_routing: bool) -> Option<Self> {
        web_sys::window().map(|window| Self { window, hash_routing })
    }

    fn history(&self) -> Option<web_sys::History> {
        self.window.history().ok()
    }
}

impl History for BrowserHistory {
    fn location(&self) -> String {
        let location = self.window.location();
        if self.hash_routing {
            return location.hash().unwrap_or_default();
        }
        format!(
            "{}{}{}",
            location.pathname().unwrap_or_default(),
            location.search().unwrap_or_default(),
            location.hash().unwrap_or_default()
        )
    }

    fn push(&self, location: &str) {
        if let Some(history) = self.history() {
            report("pushState", history.push_state_with_url(&JsValue::NULL, "", Some(location)));
        }
    }

    fn replace(&self, location: &str) {
        if let Some(history) = self.history() {
            report("replaceState", history.replace_state_with_url(&JsValue::NULL, "", Some(location)));
        }
    }

    /// Browser back is asynchronous; the following popstate event drives
    /// the route change, so there is no location to report yet.
    fn back(&self) -> Option<String> {
        if let Some(history) = self.history() {
            report("history.back", history.back());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_name_the_history_call() {
        assert_eq!(failure_message("history.back", &"SecurityError"), "history.back failed: \"SecurityError\"");
    }
}
