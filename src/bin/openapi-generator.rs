//! Print the OpenAPI document as JSON.

use utoipa::OpenApi;
use workout_tally::services::documentation::ApiDoc;

fn main() -> Result<(), serde_json::Error> {
    let doc = ApiDoc::openapi();
    println!("{}", doc.to_pretty_json()?);
    Ok(())
}
