//! Classification of errors for presentation to API consumers.

use failure::Fail;
use http::StatusCode;
use std::borrow::Cow;

/// An error which can be reported to a client of this library.
///
/// This crate does not render responses itself. Callers serving requests use
/// [`ApiError::status()`] to choose a response status, and
/// [`ApiError::code()`] to decide whether details may be shown. Errors without
/// a code are internal and should be reported as a bare
/// `500 Internal Server Error`.
pub trait ApiError: Fail {
    /// HTTP response status code.
    fn status(&self) -> StatusCode;

    /// Internal code describing this error.
    ///
    /// This code is used to identify this error outside the system, and thus
    /// should only be present for errors which are intended to be reported
    /// to the user in detail.
    fn code(&self) -> Option<Cow<str>>;

    /// Is this an internal error, which should not be described to the user?
    fn is_internal(&self) -> bool {
        self.code().is_none()
    }
}
