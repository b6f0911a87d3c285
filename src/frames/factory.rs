//! Frame element construction: sandbox, allow, creation interceptor

use super::handle::{FrameElement, FrameId, FrameKind};
use crate::config::ShellConfig;
use crate::core::paths::frames::SANDBOX_RULES;
use crate::navigation::{Context, NavigationNode, WebComponent};

/// Baseline sandbox tokens unioned with custom ones, order preserved.
pub fn sandbox_rules(custom: &[String]) -> Vec<String> {
    let mut rules: Vec<String> = SANDBOX_RULES.iter().map(|r| r.to_string()).collect();
    for rule in custom {
        let rule = rule.trim();
        if !rule.is_empty() && !rules.iter().any(|r| r == rule) {
            rules.push(rule.to_string());
        }
    }
    rules
}

/// `allow` attribute: every rule terminated by `;`, space separated.
pub fn allow_attribute(rules: &[String]) -> String {
    rules
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(|r| if r.ends_with(';') { r.to_string() } else { format!("{};", r) })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn create_iframe(id: FrameId, view_url: &str, node: &NavigationNode, config: &ShellConfig) -> FrameElement {
    let mut element = FrameElement::new(id, FrameKind::Iframe, "iframe", view_url);
    element.sandbox = sandbox_rules(&config.settings.custom_sandbox_rules).join(" ");
    element.allow = allow_attribute(&config.settings.allow_rules);
    if let Some(vg) = &node.view_group {
        element.set_attribute("vg", vg.clone());
    }
    intercept(&mut element, node, config);
    element
}

pub fn create_web_component(
    id: FrameId,
    view_url: &str,
    node: &NavigationNode,
    context: &Context,
    config: &ShellConfig,
) -> FrameElement {
    let tag = match &node.webcomponent {
        Some(WebComponent::Settings(s)) => s.tag_name.clone().unwrap_or_else(|| web_component_tag(view_url)),
        _ => web_component_tag(view_url),
    };
    let mut element = FrameElement::new(id, FrameKind::WebComponent, tag, view_url);
    element.set_attribute("context", serde_json::Value::Object(context.clone()).to_string());
    intercept(&mut element, node, config);
    element
}

/// Custom element tag derived from the component URL.
pub fn web_component_tag(view_url: &str) -> String {
    let slug: String = view_url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("wc-{}", slug)
}

fn intercept(element: &mut FrameElement, node: &NavigationNode, config: &ShellConfig) {
    let Some(interceptor) = &config.settings.iframe_creation_interceptor else {
        return;
    };
    let kind = element.kind;
    if let Err(err) = (interceptor.0)(element, node.view_group.as_deref(), node, kind) {
        tracing::error!(frame = %element.id, error = %err, "frame creation interceptor failed");
    }
}
