//! Bubble lifecycle: creation, timed eviction, explicit delete and purge.
//!
//! DESIGN
//! ======
//! `BubbleManager` is the single owner of everything mutable: the display
//! surface, the contrast evaluator's background, the current style, and the
//! eviction queue. All operations run to completion on the caller's control
//! flow; nothing here blocks or spawns.
//!
//! EVICTION
//! ========
//! Each displayed bubble gets a ticket, and a deadline `(due, ticket,
//! message_id)` goes into a min-heap. The host loop sleeps until
//! `next_eviction()` and then calls `evict_expired(now)`. A deadline only
//! removes its bubble while its ticket is still the live one for that
//! message id, so a deadline left behind by an explicit delete (or by a
//! bubble that was replaced under the same id) fires as a no-op.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::color::{ContrastEvaluator, Rgb, invert_color, parse_color, rgb_to_hex};
use crate::config::WidgetConfig;
use crate::markup::{Node, Raw, Value, html};
use crate::surface::Surface;

pub const MESSAGE_ID_ATTR: &str = "message-id";
pub const USER_ID_ATTR: &str = "user-id";

// =============================================================================
// TYPES
// =============================================================================

/// One chat message to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub user_id: String,
    pub message_id: String,
    /// Raw CSS color expression for the sender's name.
    pub color: String,
    pub name: String,
    pub text: MessageText,
}

/// Message body: plain text is escaped, prepared markup is inserted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageText {
    Plain(String),
    /// Markup from the host's own renderer.
    Prepared(Raw),
}

impl From<&MessageText> for Value {
    fn from(text: &MessageText) -> Self {
        match text {
            MessageText::Plain(text) => Value::Escaped(text.clone()),
            MessageText::Prepared(raw) => Value::Raw(raw.clone()),
        }
    }
}

/// Host-supplied panel colors as raw CSS expressions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub foreground: String,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Eviction {
    due: Instant,
    ticket: u64,
    message_id: String,
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct BubbleManager {
    surface: Surface,
    contrast: ContrastEvaluator,
    style: StyleConfig,
    eviction_delay: Duration,
    /// Live ticket per displayed message id.
    live: HashMap<String, u64>,
    evictions: BinaryHeap<Reverse<Eviction>>,
    next_ticket: u64,
}

impl BubbleManager {
    /// Create a manager with an empty surface and the configured (or default) style applied.
    #[must_use]
    pub fn new(config: &WidgetConfig) -> Self {
        let mut manager = Self {
            surface: Surface::new(config.container_id.clone()),
            contrast: ContrastEvaluator::default(),
            style: StyleConfig::default(),
            eviction_delay: config.eviction_delay,
            live: HashMap::new(),
            evictions: BinaryHeap::new(),
            next_ticket: 0,
        };
        manager.reconfigure_style(config.initial_style.clone().unwrap_or_default());
        manager
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[must_use]
    pub fn contrast(&self) -> &ContrastEvaluator {
        &self.contrast
    }

    #[must_use]
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    #[must_use]
    pub fn eviction_delay(&self) -> Duration {
        self.eviction_delay
    }

    /// Render a message at the head of the surface and schedule its eviction.
    pub fn dispatch(&mut self, message: Message) {
        self.dispatch_at(message, Instant::now());
    }

    /// [`dispatch`](Self::dispatch) with an explicit clock reading.
    pub fn dispatch_at(&mut self, message: Message, now: Instant) {
        let color = parse_color(&message.color).unwrap_or(Rgb::DEFAULT_FOREGROUND);
        let stroke = self.contrast.needs_stroke(color);

        let Some(node) = render_bubble(&message, color, stroke) else {
            warn!(message_id = %message.message_id, "bubble template produced no node");
            return;
        };

        if self.live.remove(&message.message_id).is_some() {
            self.surface.remove_by_attr(MESSAGE_ID_ATTR, &message.message_id);
            debug!(message_id = %message.message_id, "replacing displayed bubble");
        }

        self.surface.prepend(node);

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.live.insert(message.message_id.clone(), ticket);
        match now.checked_add(self.eviction_delay) {
            Some(due) => self.evictions.push(Reverse(Eviction { due, ticket, message_id: message.message_id.clone() })),
            None => warn!(message_id = %message.message_id, delay = ?self.eviction_delay, "eviction delay out of range, bubble kept until deleted"),
        }

        debug!(
            message_id = %message.message_id,
            user_id = %message.user_id,
            color = %color,
            stroke,
            "bubble dispatched"
        );
    }

    /// Remove the bubble for `message_id`. Absent ids are a no-op.
    pub fn delete_message(&mut self, message_id: &str) -> usize {
        self.live.remove(message_id);
        let removed = self.surface.remove_by_attr(MESSAGE_ID_ATTR, message_id).len();
        debug!(%message_id, removed, "delete message");
        removed
    }

    /// Remove every bubble from `user_id`.
    pub fn purge_user(&mut self, user_id: &str) -> usize {
        let removed = self.surface.remove_by_attr(USER_ID_ATTR, user_id);
        for node in &removed {
            if let Some(message_id) = node.attr(MESSAGE_ID_ATTR) {
                self.live.remove(message_id);
            }
        }
        debug!(%user_id, removed = removed.len(), "purge user");
        removed.len()
    }

    /// Replace the style: rebuild the stylesheet and reset the stroke background.
    pub fn reconfigure_style(&mut self, config: StyleConfig) {
        let background = parse_color(&config.background).unwrap_or(Rgb::DEFAULT_BACKGROUND);
        let foreground = parse_color(&config.foreground).unwrap_or(Rgb::DEFAULT_FOREGROUND);

        match render_stylesheet(self.surface.id(), background, foreground) {
            Some(node) => self.surface.set_stylesheet(node),
            None => warn!("stylesheet template produced no node"),
        }
        self.contrast.reset(background);

        info!(background = %background, foreground = %foreground, "style reconfigured");
        self.style = config;
    }

    /// Earliest pending eviction deadline, stale ones included.
    #[must_use]
    pub fn next_eviction(&self) -> Option<Instant> {
        self.evictions.peek().map(|Reverse(e)| e.due)
    }

    /// Fire every eviction due at or before `now`. Returns bubbles removed.
    pub fn evict_expired(&mut self, now: Instant) -> usize {
        let mut evicted = 0;
        while let Some(Reverse(next)) = self.evictions.peek() {
            if next.due > now {
                break;
            }
            let Some(Reverse(eviction)) = self.evictions.pop() else {
                break;
            };
            if self.live.get(&eviction.message_id) != Some(&eviction.ticket) {
                continue;
            }
            self.live.remove(&eviction.message_id);
            evicted += self
                .surface
                .remove_by_attr(MESSAGE_ID_ATTR, &eviction.message_id)
                .len();
            debug!(message_id = %eviction.message_id, "bubble evicted");
        }
        evicted
    }
}

// =============================================================================
// TEMPLATES
// =============================================================================

fn render_bubble(message: &Message, color: Rgb, stroke: bool) -> Option<Node> {
    let class = if stroke { "name stroke" } else { "name" };
    html(
        &[
            r#"<div class="bubble" user-id=""#,
            r#"" message-id=""#,
            r#""><span class=""#,
            r#"" style="color: "#,
            r#"">"#,
            r#"</span>: <span class="text">"#,
            "</span></div>",
        ],
        &[
            message.user_id.as_str().into(),
            message.message_id.as_str().into(),
            Raw::new(class).into(),
            Raw::new(rgb_to_hex(color)).into(),
            message.name.as_str().into(),
            (&message.text).into(),
        ],
    )
    .into_iter()
    .next()
}

fn render_stylesheet(container_id: &str, background: Rgb, foreground: Rgb) -> Option<Node> {
    let id = Raw::new(css_ident(container_id));
    let outline = Raw::new(rgb_to_hex(invert_color(background)));
    html(
        &[
            "<style>#",
            " { background-color: ",
            "; color: ",
            "; } #",
            " .stroke { text-shadow: -1px -1px 0 ",
            ", 1px -1px 0 ",
            ", -1px 1px 0 ",
            ", 1px 1px 0 ",
            "; }</style>",
        ],
        &[
            id.clone().into(),
            Raw::new(rgb_to_hex(background)).into(),
            Raw::new(rgb_to_hex(foreground)).into(),
            id.into(),
            outline.clone().into(),
            outline.clone().into(),
            outline.clone().into(),
            outline.into(),
        ],
    )
    .into_iter()
    .next()
}

/// Keep only characters that cannot end a selector or the style element.
fn css_ident(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;
