/// Greeting shown when the assistant panel opens.
pub const WELCOME: &str = "Hey! I'm your TaskFlow assistant. How can I help you today?";

/// Canned assistant response. There is no inference behind this yet; the
/// widget exists so the surface is in place when a model gets wired up.
pub fn reply(_message: &str) -> &'static str {
    "I'm a demo assistant. AI functionality coming soon!"
}
