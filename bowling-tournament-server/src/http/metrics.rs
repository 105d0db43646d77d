use bowling_tournament_macros::method;
use hyper::header::{HeaderValue, CONTENT_TYPE};

use crate::http::{Request, Response, Result};

pub async fn route(req: Request) -> Result {
    method!(req, {
        GET => get(req).await,
    })
}

async fn get(req: Request) -> Result {
    let body = req.state().metrics.serialize();

    Ok(Response::ok()
        .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
        .body(body))
}
