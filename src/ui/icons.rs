//! Emoji used across command output, with plain-text fallbacks.

use console::Emoji;

// Status
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");

// Launch
pub static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "[WEB]");
pub static HOUSE: Emoji<'_, '_> = Emoji("🏠 ", "[APP]");
pub static RESET: Emoji<'_, '_> = Emoji("🔄 ", "[RESET]");

// Inventory
pub static BARREL: Emoji<'_, '_> = Emoji("🛢️  ", "");
pub static GRAPE: Emoji<'_, '_> = Emoji("🍇 ", "");
pub static HEART: Emoji<'_, '_> = Emoji("❤️  ", "*");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "");

/// Map an activity symbol name to a terminal glyph.
pub fn activity_icon(name: &str) -> Emoji<'static, 'static> {
    match name {
        "thermometer" => Emoji("🌡️  ", "[T]"),
        "drop" => Emoji("💧 ", "[pH]"),
        "chart.bar" => Emoji("📊 ", "[V]"),
        "flask" => Emoji("⚗️  ", "[S]"),
        "location" => Emoji("📍 ", "[L]"),
        "plus.circle" => Emoji("➕ ", "[+]"),
        "minus.circle" => Emoji("➖ ", "[-]"),
        _ => Emoji("✏️  ", "[*]"),
    }
}
