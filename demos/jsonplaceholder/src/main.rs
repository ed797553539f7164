//! JSONPlaceholder Example
//!
//! Declares two request templates once and invokes them with per-call arguments.

// Example-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use stencil::prelude::*;

// ============================================================================
// Data Types
// ============================================================================

/// Payload for creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

/// A stored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

// ============================================================================
// Templates
// ============================================================================

const HOST: &str = "jsonplaceholder.typicode.com";

/// `POST /posts`, answered with pretty-printed JSON.
pub fn create_post<C: Connector>(connector: C) -> Result<Invoker<C>> {
    stencil::builder(connector)
        .post()
        .https()
        .host(HOST)
        .path_segment("posts")
        .header("Accept", "application/json")
        .build()
}

/// `GET /posts/{id}[?userId=..]`, decoded into a [`Post`].
pub fn get_post<C: Connector>(
    connector: C,
    scheme: Scheme,
    host: &str,
    port: u16,
) -> Result<Invoker<C, JsonExtractor<Post>>> {
    stencil::builder(connector)
        .get()
        .scheme(scheme)
        .host(host)
        .port(port)
        .path_segment("posts")
        .path_param("id")
        .query_param("userId")
        .result_extractor(JsonExtractor::new())
        .build()
}

#[tokio::main]
async fn main() -> stencil::Result<()> {
    let connector = HyperConnector::builder().with_logging().build();

    let create = create_post(connector.clone())?;
    let new_post = NewPost {
        title: "Hi".to_string(),
        body: "Hello".to_string(),
        user_id: 42,
    };

    let (status, created) = create.invoke(&[Arg::json(new_post)]).await?;
    println!("POST /posts -> {status}");
    println!("{created}");

    let fetch = get_post(connector, Scheme::Https, HOST, 0)?;
    let (status, post) = fetch.invoke(&[Arg::path("id", "1")]).await?;
    println!("GET /posts/1 -> {status}");
    println!("{post:#?}");

    Ok(())
}

// ============================================================================
// Tests using wiremock
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn post() -> Post {
        Post {
            id: 1,
            title: "Hi".to_string(),
            body: "Hello".to_string(),
            user_id: 42,
        }
    }

    #[tokio::test]
    async fn test_get_post() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/posts/1"))
            .and(query_param("userId", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(post()))
            .mount(&mock_server)
            .await;

        let address = mock_server.address();
        let fetch = get_post(
            HyperConnector::new(),
            Scheme::Http,
            &address.ip().to_string(),
            address.port(),
        )
        .expect("build");

        let (status, fetched) = fetch
            .invoke(&[Arg::path("id", "1"), Arg::query("userId", "42")])
            .await
            .expect("invoke");

        assert_eq!(status, 200);
        assert_eq!(fetched, post());
    }

    #[test]
    fn test_create_post_template() {
        let create = create_post(HyperConnector::new()).expect("build");

        assert_eq!(create.template().url(), "https://jsonplaceholder.typicode.com/posts");
        assert_eq!(create.template().method().as_str(), "POST");
    }
}
