mod method;

use proc_macro::TokenStream;

/// Match the HTTP request method of a request.
///
/// The following request methods are allowed:
/// - `GET`
/// - `POST`
/// - `PUT`
/// - `DELETE`
///
/// The `HEAD` and `OPTIONS` implementations are automatically generated. All other missing
/// methods are responded to with a `405 Method Not Allowed` status.
///
/// # Examples
/// ```ignore
/// # use bowling_tournament_macros::method;
/// #
/// async fn route(req: Request) -> Result {
///     method!(req, {
///         GET => get(req).await,
///         DELETE => delete(req).await,
///     })
/// }
/// ```
#[proc_macro]
pub fn method(input: TokenStream) -> TokenStream {
    method::method(input)
}
