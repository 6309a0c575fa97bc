//! Print the OpenAPI document as pretty JSON for client generators.

use std::io;

use qna_backend::ApiDoc;
use utoipa::OpenApi;

fn main() -> io::Result<()> {
    let document = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|error| io::Error::other(format!("render OpenAPI document: {error}")))?;
    println!("{document}");
    Ok(())
}
