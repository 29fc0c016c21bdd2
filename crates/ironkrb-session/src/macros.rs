/// Creates a `KrbMsgError` with `General` kind
///
/// Shorthand for
/// ```rust
/// <ironkrb_session::KrbMsgError as ironkrb_session::KrbMsgErrorExt>::general(context)
/// ```
#[macro_export]
macro_rules! general_err {
    ( $context:expr $(,)? ) => {{
        <$crate::KrbMsgError as $crate::KrbMsgErrorExt>::general($context)
    }};
}

/// Creates a `KrbMsgError` rejecting an inbound message
///
/// Shorthand for
/// ```rust
/// <ironkrb_session::KrbMsgError as ironkrb_session::KrbMsgErrorExt>::rejected(context, kind)
/// ```
#[macro_export]
macro_rules! reject_err {
    ( $context:expr, $kind:expr $(,)? ) => {{
        <$crate::KrbMsgError as $crate::KrbMsgErrorExt>::rejected($context, $kind)
    }};
}

/// Creates a `KrbMsgError` with `Crypto` kind
///
/// Shorthand for
/// ```rust
/// <ironkrb_session::KrbMsgError as ironkrb_session::KrbMsgErrorExt>::crypto(context, error)
/// ```
#[macro_export]
macro_rules! crypto_err {
    ( $context:expr, $error:expr $(,)? ) => {{
        <$crate::KrbMsgError as $crate::KrbMsgErrorExt>::crypto($context, $error)
    }};
}

/// Asserts at compile time that a type implements the given traits
macro_rules! assert_impl {
    ($type:ty: $($trait:path),+ $(,)?) => {
        const _: fn() = || {
            // Only callable when `$type` implements all traits in `$($trait)+`.
            fn assert_impl_all<T: ?Sized $(+ $trait)+>() {}
            assert_impl_all::<$type>();
        };
    };
}
