/// Auto-implement [`From`] for a type.
///
/// ```ignore
/// impl_from! { for FindNodeError ;
///     DbError => |e| FindNodeError::Database(e),
/// }
/// ```
#[macro_export]
macro_rules! impl_from {
    { for $type:ty ;
        $(
            $from:ty => | $pat:pat | $value:expr
        ),+
        $(,)*
    } => {
        $(
            impl From<$from> for $type {
                fn from(f: $from) -> $type {
                    let $pat = f;
                    $value
                }
            }
        )+
    };
}
