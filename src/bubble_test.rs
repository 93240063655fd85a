use super::*;
use crate::markup::Element;

fn manager() -> BubbleManager {
    BubbleManager::new(&WidgetConfig::default())
}

fn message(message_id: &str, user_id: &str) -> Message {
    Message {
        user_id: user_id.into(),
        message_id: message_id.into(),
        color: "#ff0000".into(),
        name: "Alice".into(),
        text: MessageText::Plain("hello".into()),
    }
}

fn message_ids(manager: &BubbleManager) -> Vec<String> {
    manager
        .surface()
        .nodes()
        .filter_map(|n| n.attr(MESSAGE_ID_ATTR))
        .map(ToOwned::to_owned)
        .collect()
}

fn span<'a>(bubble: &'a Node, class: &str) -> &'a Element {
    let Some(div) = bubble.as_element() else {
        panic!("bubble is not an element");
    };
    div.children
        .iter()
        .filter_map(Node::as_element)
        .find(|el| el.tag == "span" && el.has_class(class))
        .unwrap_or_else(|| panic!("no span.{class} in {}", bubble.to_html()))
}

fn bubble<'a>(manager: &'a BubbleManager, message_id: &str) -> &'a Node {
    manager
        .surface()
        .find_by_attr(MESSAGE_ID_ATTR, message_id)
        .unwrap_or_else(|| panic!("bubble {message_id} not displayed"))
}

// =============================================================================
// DISPATCH
// =============================================================================

#[test]
fn dispatch_inserts_one_tagged_node() {
    let mut mgr = manager();
    mgr.dispatch(message("m1", "u1"));

    assert_eq!(message_ids(&mgr), vec!["m1"]);
    let node = bubble(&mgr, "m1");
    assert_eq!(node.attr(USER_ID_ATTR), Some("u1"));
    assert_eq!(node.attr("class"), Some("bubble"));
    assert_eq!(span(node, "name").children, vec![Node::Text("Alice".into())]);
    assert_eq!(Node::Element(span(node, "text").clone()).text_content(), "hello");
}

#[test]
fn dispatch_prepends_newer_messages() {
    let mut mgr = manager();
    mgr.dispatch(message("m1", "u1"));
    mgr.dispatch(message("m2", "u2"));
    assert_eq!(message_ids(&mgr), vec!["m2", "m1"]);
}

#[test]
fn dispatch_escapes_name_and_plain_text() {
    let mut mgr = manager();
    let mut msg = message("m1", "u1");
    msg.name = "<b>Mallory</b>".into();
    msg.text = MessageText::Plain("<img src=x onerror=alert(1)> & 'so on'".into());
    mgr.dispatch(msg);

    let node = bubble(&mgr, "m1");
    let name = span(node, "name");
    assert_eq!(name.children, vec![Node::Text("<b>Mallory</b>".into())]);
    let text = span(node, "text");
    assert_eq!(text.children, vec![Node::Text("<img src=x onerror=alert(1)> & 'so on'".into())]);
}

#[test]
fn dispatch_escapes_identifiers_in_attributes() {
    let mut mgr = manager();
    mgr.dispatch(message(r#"m1" onclick="x"#, "u1"));
    let node = bubble(&mgr, r#"m1" onclick="x"#);
    assert_eq!(node.attr("onclick"), None);
}

#[test]
fn dispatch_prepared_text_is_not_double_escaped() {
    let mut mgr = manager();
    let mut msg = message("m1", "u1");
    msg.text = MessageText::Prepared(Raw::new("hi <img class=\"emote\" src=\"kappa.png\"> &amp; bye"));
    mgr.dispatch(msg);

    let text = span(bubble(&mgr, "m1"), "text");
    assert_eq!(text.children.len(), 3);
    assert_eq!(text.children[0], Node::Text("hi ".into()));
    assert_eq!(text.children[1].attr("class"), Some("emote"));
    assert_eq!(Node::Element(text.clone()).text_content(), "hi  & bye");
}

#[test]
fn templates_add_no_line_breaks_and_keep_host_ones() {
    let mut mgr = manager();
    let mut msg = message("m1", "u1");
    msg.text = MessageText::Prepared(Raw::new("<pre>line one\n  line two</pre>"));
    mgr.dispatch(msg);

    let html = mgr.surface().to_html();
    assert!(html.contains("<pre>line one\n  line two</pre>"), "{html}");
    assert_eq!(html.matches('\n').count(), 1, "{html}");
}

#[test]
fn dispatch_colors_name_with_resolved_hex() {
    let mut mgr = manager();
    let mut msg = message("m1", "u1");
    msg.color = "hsl(120, 100%, 50%)".into();
    mgr.dispatch(msg);
    assert_eq!(span(bubble(&mgr, "m1"), "name").attr("style"), Some("color: #00ff00"));
}

#[test]
fn dispatch_falls_back_to_default_foreground() {
    let mut mgr = manager();
    let mut msg = message("m1", "u1");
    msg.color = "definitely not a color".into();
    mgr.dispatch(msg);

    let name = span(bubble(&mgr, "m1"), "name");
    assert_eq!(name.attr("style"), Some("color: #eeeeee"));
    assert!(!name.has_class("stroke"));
}

#[test]
fn dispatch_strokes_colors_close_to_background() {
    let mut mgr = manager();
    let mut dark = message("m1", "u1");
    dark.color = "#282828".into();
    mgr.dispatch(dark);
    let mut bright = message("m2", "u2");
    bright.color = "white".into();
    mgr.dispatch(bright);

    assert!(span(bubble(&mgr, "m1"), "name").has_class("stroke"));
    assert!(!span(bubble(&mgr, "m2"), "name").has_class("stroke"));
}

#[test]
fn dispatch_same_id_replaces_displayed_bubble() {
    let mut mgr = manager();
    mgr.dispatch(message("m1", "u1"));
    mgr.dispatch(message("m2", "u1"));
    let mut again = message("m1", "u1");
    again.text = MessageText::Plain("edited".into());
    mgr.dispatch(again);

    assert_eq!(message_ids(&mgr), vec!["m1", "m2"]);
    assert_eq!(Node::Element(span(bubble(&mgr, "m1"), "text").clone()).text_content(), "edited");
}

// =============================================================================
// DELETE / PURGE
// =============================================================================

#[test]
fn delete_removes_only_target_and_is_idempotent() {
    let mut mgr = manager();
    mgr.dispatch(message("m1", "u1"));
    mgr.dispatch(message("m2", "u1"));

    assert_eq!(mgr.delete_message("m1"), 1);
    assert_eq!(message_ids(&mgr), vec!["m2"]);
    assert_eq!(mgr.delete_message("m1"), 0);
    assert_eq!(message_ids(&mgr), vec!["m2"]);
}

#[test]
fn delete_unknown_id_is_noop() {
    let mut mgr = manager();
    assert_eq!(mgr.delete_message("ghost"), 0);
    assert!(mgr.surface().is_empty());
}

#[test]
fn purge_removes_every_bubble_of_user() {
    let mut mgr = manager();
    assert_eq!(mgr.purge_user("u1"), 0);

    mgr.dispatch(message("m1", "u1"));
    mgr.dispatch(message("m2", "u2"));
    assert_eq!(mgr.purge_user("u2"), 1);

    mgr.dispatch(message("m3", "u1"));
    mgr.dispatch(message("m4", "u1"));
    mgr.dispatch(message("m5", "u3"));
    assert_eq!(mgr.purge_user("u1"), 3);
    assert_eq!(message_ids(&mgr), vec!["m5"]);
    assert_eq!(mgr.purge_user("u1"), 0);
}

// =============================================================================
// EVICTION
// =============================================================================

#[test]
fn bubble_is_evicted_after_delay() {
    let mut mgr = manager();
    let start = Instant::now();
    mgr.dispatch_at(message("m1", "u1"), start);

    assert_eq!(mgr.next_eviction(), Some(start + Duration::from_secs(30)));
    assert_eq!(mgr.evict_expired(start + Duration::from_secs(29)), 0);
    assert_eq!(message_ids(&mgr), vec!["m1"]);

    assert_eq!(mgr.evict_expired(start + Duration::from_secs(30)), 1);
    assert!(mgr.surface().is_empty());
    assert_eq!(mgr.next_eviction(), None);
}

#[test]
fn evictions_fire_in_deadline_order() {
    let mut mgr = manager();
    let start = Instant::now();
    mgr.dispatch_at(message("m1", "u1"), start);
    mgr.dispatch_at(message("m2", "u1"), start + Duration::from_secs(10));

    assert_eq!(mgr.evict_expired(start + Duration::from_secs(35)), 1);
    assert_eq!(message_ids(&mgr), vec!["m2"]);
    assert_eq!(mgr.next_eviction(), Some(start + Duration::from_secs(40)));
}

#[test]
fn eviction_after_explicit_delete_is_noop() {
    let mut mgr = manager();
    let start = Instant::now();
    mgr.dispatch_at(message("m1", "u1"), start);
    mgr.dispatch_at(message("m2", "u2"), start);
    mgr.delete_message("m1");
    mgr.purge_user("u2");

    assert_eq!(mgr.evict_expired(start + Duration::from_secs(60)), 0);
    assert_eq!(mgr.next_eviction(), None);
}

#[test]
fn stale_timer_does_not_evict_reused_id() {
    let mut mgr = manager();
    let start = Instant::now();
    mgr.dispatch_at(message("m1", "u1"), start);
    mgr.delete_message("m1");
    mgr.dispatch_at(message("m1", "u1"), start + Duration::from_secs(20));

    // The first timer is due at 30s but belongs to the deleted bubble.
    assert_eq!(mgr.evict_expired(start + Duration::from_secs(31)), 0);
    assert_eq!(message_ids(&mgr), vec!["m1"]);

    assert_eq!(mgr.evict_expired(start + Duration::from_secs(50)), 1);
    assert!(mgr.surface().is_empty());
}

#[test]
fn eviction_delay_comes_from_config() {
    let config = WidgetConfig { eviction_delay: Duration::from_secs(2), ..WidgetConfig::default() };
    let mut mgr = BubbleManager::new(&config);
    let start = Instant::now();
    mgr.dispatch_at(message("m1", "u1"), start);
    assert_eq!(mgr.eviction_delay(), Duration::from_secs(2));
    assert_eq!(mgr.evict_expired(start + Duration::from_secs(2)), 1);
}

#[test]
fn unrepresentable_delay_keeps_bubble_until_deleted() {
    let config = WidgetConfig { eviction_delay: Duration::from_secs(u64::MAX), ..WidgetConfig::default() };
    let mut mgr = BubbleManager::new(&config);
    let start = Instant::now();

    mgr.dispatch_at(message("m1", "u1"), start);
    mgr.dispatch(message("m2", "u1"));

    assert_eq!(message_ids(&mgr), vec!["m2", "m1"]);
    assert_eq!(mgr.next_eviction(), None);
    assert_eq!(mgr.evict_expired(start + Duration::from_secs(3600)), 0);
    assert_eq!(mgr.delete_message("m1"), 1);
    assert_eq!(message_ids(&mgr), vec!["m2"]);
}

// =============================================================================
// STYLE
// =============================================================================

#[test]
fn default_style_is_applied_on_creation() {
    let mgr = manager();
    assert_eq!(mgr.contrast().background(), Rgb::DEFAULT_BACKGROUND);
    let Some(style) = mgr.surface().stylesheet() else {
        panic!("no stylesheet");
    };
    let css = style.text_content();
    assert!(css.contains("#chat { background-color: #282828; color: #eeeeee; }"), "{css}");
    assert!(css.contains("1px 1px 0 #d7d7d7"), "{css}");
}

#[test]
fn reconfigure_resets_stroke_background() {
    let mut mgr = manager();
    mgr.reconfigure_style(StyleConfig { background: "#000000".into(), foreground: "#ffffff".into() });

    let Some(black) = parse_color("#000000") else {
        panic!("black did not parse");
    };
    assert!(mgr.contrast().needs_stroke(black));
    assert_eq!(mgr.style().background, "#000000");
}

#[test]
fn reconfigure_replaces_stylesheet_wholesale() {
    let mut mgr = manager();
    mgr.reconfigure_style(StyleConfig { background: "white".into(), foreground: "rgb(0, 0, 0)".into() });
    mgr.reconfigure_style(StyleConfig { background: "navy".into(), foreground: "bogus".into() });

    let Some(style) = mgr.surface().stylesheet() else {
        panic!("no stylesheet");
    };
    let css = style.text_content();
    assert!(css.contains("background-color: #000080; color: #eeeeee;"), "{css}");
    assert!(css.contains("#ffff7f"), "{css}");
    assert!(!css.contains("#ffffff"), "{css}");
}

#[test]
fn reconfigure_does_not_restyle_existing_bubbles() {
    let mut mgr = manager();
    let mut msg = message("m1", "u1");
    msg.color = "#ffffff".into();
    mgr.dispatch(msg);
    assert!(!span(bubble(&mgr, "m1"), "name").has_class("stroke"));

    mgr.reconfigure_style(StyleConfig { background: "white".into(), foreground: "black".into() });
    assert!(!span(bubble(&mgr, "m1"), "name").has_class("stroke"));

    let mut later = message("m2", "u1");
    later.color = "#ffffff".into();
    mgr.dispatch(later);
    assert!(span(bubble(&mgr, "m2"), "name").has_class("stroke"));
}

#[test]
fn initial_style_from_config() {
    let config = WidgetConfig {
        container_id: "overlay".into(),
        initial_style: Some(StyleConfig { background: "#ffffff".into(), foreground: "#000000".into() }),
        ..WidgetConfig::default()
    };
    let mgr = BubbleManager::new(&config);
    assert_eq!(mgr.contrast().background(), Rgb::WHITE);
    assert_eq!(mgr.surface().id(), "overlay");
    let css = mgr.surface().stylesheet().map(Node::text_content).unwrap_or_default();
    assert!(css.contains("#overlay { background-color: #ffffff;"), "{css}");
}

#[test]
fn stylesheet_selector_strips_unsafe_id_characters() {
    assert_eq!(css_ident("chat</style><script>"), "chatstylescript");
    assert_eq!(css_ident("my-chat_1"), "my-chat_1");
}
