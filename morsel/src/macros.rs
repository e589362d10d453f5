/// Creates a single [`IncomingMessage`](crate::IncomingMessage) from a role
/// shorthand.
///
/// ```rust
/// use morsel::morsel_msg;
///
/// let message = morsel_msg!(user => "Best ramen near Union Square?");
/// assert_eq!(message.role.as_deref(), Some("user"));
/// assert_eq!(message.content.as_deref(), Some("Best ramen near Union Square?"));
/// ```
#[macro_export]
macro_rules! morsel_msg {
    (system => $content:expr $(,)?) => {
        $crate::IncomingMessage::new("system", $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::IncomingMessage::new("user", $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::IncomingMessage::new("assistant", $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<IncomingMessage>` from role/content pairs.
///
/// ```rust
/// use morsel::morsel_messages;
///
/// let messages = morsel_messages![
///     user => "Where should I eat in Brooklyn?",
///     assistant => "Any cuisine in mind?",
///     user => "Pizza.",
/// ];
///
/// assert_eq!(messages.len(), 3);
/// assert_eq!(messages[1].role.as_deref(), Some("assistant"));
/// ```
#[macro_export]
macro_rules! morsel_messages {
    () => {
        Vec::<$crate::IncomingMessage>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::morsel_msg!($role => $content)),+]
    };
}
