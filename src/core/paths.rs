//! Wire names and default constants for the shell
//!
//! Centralized registry for message names, query keys and defaults.
//! Every string that crosses the frame boundary lives here.

/// Host → frame messages
pub mod outbound {
    pub const NAVIGATE: &str = "luigi.navigate";
    pub const INIT: &str = "luigi.init";
    pub const INACTIVE: &str = "luigi-client.inactive-microfrontend";
    pub const ALERT_CLOSED: &str = "luigi.ux.alert.hide";
    pub const CONFIRMATION_CLOSED: &str = "luigi.ux.confirmationModal.hide";
    pub const PATH_EXISTS_ANSWER: &str = "luigi.navigation.pathExists.answer";
    pub const CUSTOM: &str = "custom";
}

/// Frame → host events (stable names, see `bridge::events`)
pub mod inbound {
    pub const NAVIGATION_REQUEST: &str = "navigation-request";
    pub const ALERT_REQUEST: &str = "show-alert-request";
    pub const CONFIRMATION_MODAL_REQUEST: &str = "show-confirmation-modal-request";
    pub const SHOW_LOADING_INDICATOR: &str = "show-loading-indicator-request";
    pub const HIDE_LOADING_INDICATOR: &str = "hide-loading-indicator-request";
    pub const ADD_BACKDROP: &str = "add-backdrop-request";
    pub const REMOVE_BACKDROP: &str = "remove-backdrop-request";
    pub const SET_DIRTY_STATUS: &str = "set-dirty-status-request";
    pub const ADD_NODE_PARAMS: &str = "add-node-params-request";
    pub const ADD_SEARCH_PARAMS: &str = "add-search-params-request";
    pub const CUSTOM_MESSAGE: &str = "custom-message";
    pub const SET_DOCUMENT_TITLE: &str = "set-document-title-request";
    pub const OPEN_USER_SETTINGS: &str = "open-user-settings-request";
    pub const CLOSE_USER_SETTINGS: &str = "close-user-settings-request";
    pub const INITIALIZED: &str = "initialized";
    pub const SET_ANCHOR: &str = "set-anchor-request";
    pub const CHECK_PATH_EXISTS: &str = "check-path-exists-request";
    pub const GO_BACK: &str = "go-back-request";
    pub const GET_CONTEXT: &str = "get-context-request";
    pub const NAVIGATE_OK: &str = "navigate.ok";
}

/// Query string contract
pub mod query {
    pub const NODE_PARAM_PREFIX: &str = "~";
    pub const MODAL_PATH_PARAM: &str = "modalPath";
    pub const MODAL_PARAMS_SUFFIX: &str = "Params";
    pub const SKIP_PATTERNS: &[&str] = &["access_token=", "id_token="];
}

/// Frame lifecycle defaults
pub mod frames {
    /// Milliseconds to wait for `navigate.ok` before replacing a reused frame
    pub const NAVIGATE_OK_TIMEOUT_MS: u64 = 2000;
    /// Clients older than this never report `initOk`
    pub const MIN_HANDSHAKE_CLIENT_VERSION: &str = "1.1.1";
    /// View-group frames preloaded per `preload` call
    pub const PRELOAD_BATCH_SIZE: usize = 3;
    pub const SANDBOX_RULES: &[&str] = &[
        "allow-forms",
        "allow-modals",
        "allow-popups",
        "allow-popups-to-escape-sandbox",
        "allow-same-origin",
        "allow-scripts",
    ];
}

/// Redirect descent guard for children resolvers that never bottom out
pub const MAX_REDIRECT_DEPTH: usize = 32;

pub const PAGE_NOT_FOUND_TEXT: &str = "Could not find the requested route";
pub const DIRTY_STATUS_TEXT: &str = "You have unsaved changes. Do you really want to leave this page?";
