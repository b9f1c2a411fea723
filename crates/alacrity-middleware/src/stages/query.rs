//! Query string decoding.

use alacrity_core::{BoxFuture, Flow, Handler, HandlerResult, RequestContext};

/// Decodes the retained `?tail` into the parameter map.
///
/// Uses `application/x-www-form-urlencoded` rules (`+` becomes a space,
/// percent sequences are decoded). Keys already present — typically raw
/// route variables — are overwritten on collision, matching the parameter
/// union rules. A `#fragment` suffix is discarded before decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseQueryParams;

impl Handler for ParseQueryParams {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            if let Some(query) = ctx.query().map(ToString::to_string) {
                let query = query.split('#').next().unwrap_or_default();
                let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect();
                ctx.merge_params(pairs);
            }
            Ok(Flow::Continue)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method};

    fn ctx(target: &str) -> RequestContext {
        RequestContext::new(Method::GET, target, HeaderMap::new())
    }

    #[tokio::test]
    async fn test_decodes_pairs() {
        let mut ctx = ctx("/search?term=hello+world&page=2");
        ParseQueryParams.call(&mut ctx).await.unwrap();

        assert_eq!(ctx.param("term"), Some("hello world"));
        assert_eq!(ctx.param("page"), Some("2"));
    }

    #[tokio::test]
    async fn test_percent_decoding() {
        let mut ctx = ctx("/search?q=a%26b%3Dc");
        ParseQueryParams.call(&mut ctx).await.unwrap();

        assert_eq!(ctx.param("q"), Some("a&b=c"));
    }

    #[tokio::test]
    async fn test_no_query_is_a_noop() {
        let mut ctx = ctx("/plain");
        ParseQueryParams.call(&mut ctx).await.unwrap();
        assert!(ctx.params().is_empty());
    }

    #[tokio::test]
    async fn test_fragment_discarded() {
        let mut ctx = ctx("/doc?x=1#section");
        ParseQueryParams.call(&mut ctx).await.unwrap();
        assert_eq!(ctx.param("x"), Some("1"));
        assert_eq!(ctx.params().len(), 1);
    }

    #[tokio::test]
    async fn test_query_overwrites_earlier_params() {
        let mut ctx = ctx("/items?id=query-wins");
        ctx.set_param("id", "route-value");
        ParseQueryParams.call(&mut ctx).await.unwrap();

        assert_eq!(ctx.param("id"), Some("query-wins"));
    }
}
