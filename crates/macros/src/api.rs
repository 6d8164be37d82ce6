use proc_macro2::{TokenStream, Span};
use syn::{Attribute, Ident, Lit, Meta, MetaList, NestedMeta, spanned::Spanned};
use synstructure::{BindingInfo, Structure, VariantInfo};

#[derive(Debug)]
struct Error(TokenStream);

impl Error {
    fn new(span: Span, message: &str) -> Error {
        Error(quote_spanned! { span =>
            compile_error!(#message);
        })
    }

    fn into_tokens(self) -> TokenStream {
        self.0
    }
}

/// Parsed contents of a single `#[api(...)]` attribute.
#[derive(Default)]
struct ApiAttr {
    internal: Option<Span>,
    status: Option<Ident>,
    code: Option<Lit>,
}

pub fn derive_error(s: Structure) -> TokenStream {
    let statuses = s.each_variant(|v| match variant_status(v) {
        Ok(v) => v,
        Err(e) => e.into_tokens(),
    });

    let codes = s.each_variant(|v| match variant_code(v) {
        Ok(v) => v,
        Err(e) => e.into_tokens(),
    });

    s.gen_impl(quote! {
        use std::borrow::Cow;

        gen impl crate::error::ApiError for @Self {
            fn status(&self) -> ::http::StatusCode {
                match *self { #statuses }
            }

            fn code(&self) -> Option<Cow<str>> {
                match *self { #codes }
            }
        }
    })
}

/// Value of [`ApiError::status()`] for a variant.
fn variant_status(v: &VariantInfo) -> Result<TokenStream, Error> {
    let attr = match parse_api(v.ast().attrs)? {
        Some(attr) => attr,
        None => return delegate_to_cause(v, quote!(status)),
    };

    match attr.status {
        Some(status) => Ok(quote!(::http::StatusCode::#status)),
        None => Ok(quote!(::http::StatusCode::INTERNAL_SERVER_ERROR)),
    }
}

/// Value of [`ApiError::code()`] for a variant.
fn variant_code(v: &VariantInfo) -> Result<TokenStream, Error> {
    let attr = match parse_api(v.ast().attrs)? {
        Some(attr) => attr,
        None => return delegate_to_cause(v, quote!(code)),
    };

    match attr.code {
        Some(code) => Ok(quote!(Some(Cow::Borrowed(#code)))),
        None => Ok(quote!(None)),
    }
}

/// Variants without `#[api]` forward to the `#[cause]` field, which must
/// itself implement `ApiError`.
fn delegate_to_cause(v: &VariantInfo, method: TokenStream)
-> Result<TokenStream, Error> {
    v.bindings()
        .iter()
        .find(is_cause)
        .map(|cause| quote!(crate::error::ApiError::#method(#cause)))
        .ok_or_else(|| Error::new(
            v.ast().ident.span(),
            "each variant must be #[api]-annotated or have a #[cause]",
        ))
}

/// Given a list of attributes find `#[api(...)]`, ensure there is only one of
/// them, and parse its arguments.
fn parse_api(attrs: &[Attribute]) -> Result<Option<ApiAttr>, Error> {
    let mut metas = attrs.iter()
        .filter_map(|attr| attr.parse_meta().ok())
        .filter(|meta| meta.path().is_ident("api"));

    let meta = match metas.next() {
        Some(meta) => meta,
        None => return Ok(None),
    };

    if let Some(meta) = metas.next() {
        return Err(Error::new(
            meta.span(),
            "api attribute must be used exactly once",
        ));
    }

    let list: MetaList = match meta {
        Meta::List(list) => list,
        _ => return Err(Error::new(
            meta.span(),
            "api attribute must take a list in parentheses",
        )),
    };

    if list.nested.is_empty() {
        return Err(Error::new(
            list.span(),
            "api attribute requires at least one argument",
        ));
    }

    let mut attr = ApiAttr::default();

    for item in list.nested {
        match item {
            NestedMeta::Meta(Meta::Path(ref path)) if path.is_ident("internal") =>
                attr.internal = Some(item.span()),
            NestedMeta::Meta(Meta::NameValue(ref nv)) if nv.path.is_ident("code") =>
                attr.code = Some(nv.lit.clone()),
            NestedMeta::Meta(Meta::NameValue(ref nv)) if nv.path.is_ident("status") =>
                attr.status = Some(match nv.lit {
                    Lit::Str(ref s) => Ident::new(&s.value(), s.span()),
                    _ => return Err(Error::new(nv.lit.span(), "expected a string")),
                }),
            _ => return Err(Error::new(
                item.span(),
                "expected one of: internal, code, status",
            )),
        }
    }

    if let Some(span) = attr.internal {
        if attr.status.is_some() {
            return Err(Error::new(span, "internal errors can't have statuses"));
        }
        if attr.code.is_some() {
            return Err(Error::new(span, "internal errors can't have codes"));
        }
    }

    Ok(Some(attr))
}

fn is_cause(bi: &&BindingInfo) -> bool {
    bi.ast()
        .attrs
        .iter()
        .filter_map(|attr| attr.parse_meta().ok())
        .any(|meta| meta.path().is_ident("cause"))
}
