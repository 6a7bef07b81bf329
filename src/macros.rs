#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Declare a list of `(pattern, template)` pairs for seeding an engine.
///
/// ```
/// let rules = patter::categories![
///     "HELLO *" => "Hi there!",
///     "BYE"     => "See you.",
/// ];
/// let mut engine = patter::Engine::new();
/// for (pattern, template) in rules {
///     engine.add_category(pattern, template).unwrap();
/// }
/// ```
#[macro_export]
macro_rules! categories {
    ( $( $pattern:literal => $template:literal ),* $(,)? ) => {
        [ $( ($pattern, $template) ),* ]
    };
}
