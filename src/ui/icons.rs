//! Shared UI icons.
//!
//! Each icon has a plain-text fallback for terminals without emoji support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");

// Board entities
pub static BOARD: Emoji<'_, '_> = Emoji("📋 ", "#");
pub static COLUMN: Emoji<'_, '_> = Emoji("🗂️  ", "|");
pub static TASK: Emoji<'_, '_> = Emoji("📝 ", "-");
pub static TAG: Emoji<'_, '_> = Emoji("🏷️  ", "@");
pub static USER: Emoji<'_, '_> = Emoji("👤 ", "~");

// Notifications
pub static BELL: Emoji<'_, '_> = Emoji("🔔 ", "[N]");
pub static UNREAD: Emoji<'_, '_> = Emoji("● ", "* ");
