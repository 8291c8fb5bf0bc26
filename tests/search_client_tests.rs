use anyhow::Result;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wbrank::error::RankError;
use wbrank::search_client::{ClientOptions, WbSearchClient};

mod test_helpers {
    use super::*;
    use serde_json::json;

    /// `count` products with ids `first_id..`, optionally placing `item_id` at `index`.
    pub fn page_response(
        first_id: u64,
        count: u64,
        total: u64,
        item: Option<(usize, u64)>,
    ) -> ResponseTemplate {
        let mut ids: Vec<u64> = (first_id..first_id + count).collect();
        if let Some((index, item_id)) = item {
            ids[index] = item_id;
        }
        let products: Vec<_> = ids
            .into_iter()
            .map(|id| {
                json!({
                    "id": id,
                    "name": format!("Product {id}"),
                    "brand": "Acme",
                    "supplier": "Acme LLC"
                })
            })
            .collect();
        let body = json!({ "data": { "products": products, "total": total } });
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/plain; charset=utf-8")
    }

    pub fn client(server: &MockServer, max_retries: u32) -> Result<WbSearchClient> {
        let options = ClientOptions {
            endpoint: format!("{}/search", server.uri()),
            max_retries,
            retry_delay: Duration::from_millis(5),
            ..Default::default()
        };
        Ok(WbSearchClient::with_http_client(reqwest::Client::new(), options)?)
    }

    pub async fn mount_first_page(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param_is_missing("page"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    pub async fn mount_page(server: &MockServer, page: u32, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("page", page.to_string()))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_item_on_third_page() -> Result<()> {
    let server = MockServer::start().await;
    mount_first_page(&server, page_response(1000, 100, 500, None)).await;
    mount_page(&server, 2, page_response(2000, 100, 500, None)).await;
    mount_page(&server, 3, page_response(3000, 100, 500, Some((4, 55)))).await;
    for page in 4..=6 {
        mount_page(&server, page, page_response(page as u64 * 1000, 100, 500, None)).await;
    }

    let client = client(&server, 2)?;
    let result = client
        .search("red dress", 55)
        .await?
        .expect("item is on page 3");

    assert_eq!(result.page, 3);
    assert_eq!(result.position, 5);
    assert_eq!(result.query, "red dress");
    assert_eq!(result.product.id, 55);
    assert_eq!(result.product.name, "Product 55");
    assert_eq!(result.absolute_position(100), 205);
    Ok(())
}

#[tokio::test]
async fn test_item_on_first_page_skips_fan_out() -> Result<()> {
    let server = MockServer::start().await;
    mount_first_page(&server, page_response(1000, 100, 500, Some((0, 55)))).await;
    Mock::given(query_param("page", "2"))
        .respond_with(page_response(2000, 100, 500, None))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, 2)?;
    let result = client.search("red dress", 55).await?.expect("item is first");

    assert_eq!((result.page, result.position), (1, 1));
    Ok(())
}

#[tokio::test]
async fn test_fetches_only_pages_within_limit() -> Result<()> {
    let server = MockServer::start().await;
    mount_first_page(&server, page_response(1000, 100, 250, None)).await;
    mount_page(&server, 2, page_response(2000, 100, 250, None)).await;
    mount_page(&server, 3, page_response(3000, 50, 250, None)).await;
    Mock::given(query_param("page", "4"))
        .respond_with(page_response(4000, 100, 250, None))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, 0)?;
    assert!(client.search("red dress", 55).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_slow_earlier_page_still_wins() -> Result<()> {
    let server = MockServer::start().await;
    mount_first_page(&server, page_response(1000, 100, 300, None)).await;
    mount_page(
        &server,
        2,
        page_response(2000, 100, 300, Some((9, 55))).set_delay(Duration::from_millis(300)),
    )
    .await;
    mount_page(&server, 3, page_response(3000, 100, 300, Some((0, 55)))).await;
    mount_page(&server, 4, page_response(4000, 100, 300, None)).await;

    let client = client(&server, 0)?;
    let result = client.search("red dress", 55).await?.expect("item is found");

    assert_eq!(result.page, 2);
    assert_eq!(result.position, 10);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_first_page_is_general() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page_response(1, 1, 1, None))
        .expect(3)
        .mount(&server)
        .await;

    let client = client(&server, 2)?;
    let err = client.search("red dress", 55).await.unwrap_err();
    assert!(matches!(err, RankError::General));
    Ok(())
}

#[tokio::test]
async fn test_zero_total_is_no_products() -> Result<()> {
    let server = MockServer::start().await;
    mount_first_page(&server, page_response(1, 2, 0, None)).await;

    let client = client(&server, 2)?;
    let err = client.search("red dress", 55).await.unwrap_err();
    assert!(matches!(err, RankError::NoProducts));
    assert_eq!(err.code(), "NO_PRODUCTS");
    Ok(())
}

#[tokio::test]
async fn test_server_error_on_fan_out_page_is_skipped() -> Result<()> {
    let server = MockServer::start().await;
    mount_first_page(&server, page_response(1000, 100, 200, None)).await;
    Mock::given(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, 3, page_response(3000, 100, 200, Some((99, 55)))).await;

    let client = client(&server, 1)?;
    let result = client.search("red dress", 55).await?.expect("item is on page 3");

    assert_eq!((result.page, result.position), (3, 100));
    Ok(())
}
