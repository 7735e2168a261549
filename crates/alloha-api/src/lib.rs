//! API client library for the Alloha movie and series metadata service.
//!
//! ```no_run
//! use alloha_api::alloha::{AllohaApi, AllohaClient};
//!
//! # async fn run() -> alloha_api::alloha::Result<()> {
//! let client = AllohaClient::builder().api_token("token").build()?;
//! let response = client.find_by_imdb_id("tt0110912").await?;
//! if let Some(movie) = response.data {
//!     tracing::info!(name = %movie.name, "found");
//! }
//! # Ok(())
//! # }
//! ```

/// Alloha API client.
pub mod alloha;
