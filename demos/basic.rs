//! Minimal restwire example — negotiated replies, structured errors, a
//! redirect with cookies and a raw route.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:8081/test
//!   curl -i -H 'accept: application/xml' http://localhost:8081/test
//!   curl -i -X POST http://localhost:8081/test2 \
//!        -H 'content-type: application/json' \
//!        -d '{"Status":"x","Code":0}'
//!   curl -i -X POST http://localhost:8081/login -d 'user=alice'
//!   curl -i http://localhost:8081/logout
//!   curl -i http://localhost:8081/healthz

use std::fmt;

use restwire::{Error, Params, Raw, Redirect, Request, Router, Server, StatusCoder, reply};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TestRet {
    status: String,
    code: u16,
}

impl StatusCoder for TestRet {
    fn status_code(&self) -> u16 {
        self.code
    }
}

impl fmt::Display for TestRet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status)
    }
}

reply!(TestRet: status);

#[derive(Deserialize)]
struct Login {
    user: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .get("/test",       test)
        .post("/test2",     test2)
        .post("/login",     login)
        .get("/logout",     logout)
        .get("/report.csv", report)
        .raw_get("/healthz", healthz);

    if let Err(e) = Server::bind("0.0.0.0:8081").serve(app).await {
        tracing::error!("server error: {e}");
    }
}

// GET /test → 200 {"Status":"ok","Code":200}
async fn test(_req: Request, _params: Params) -> Result<TestRet, Error> {
    Ok(TestRet { status: "ok".into(), code: 200 })
}

// POST /test2 → the body must decode, then 403 {"Status":"oops","Code":403}
async fn test2(mut req: Request, _params: Params) -> Result<(), Error> {
    let _data: TestRet = req.parse().await?;
    Err(Error::structured(TestRet { status: "oops".into(), code: 403 }))
}

// POST /login (form) → 303 to /test with a session cookie
async fn login(mut req: Request, _params: Params) -> Result<Redirect, Error> {
    let login: Login = req.parse().await?;
    let mut redirect = Redirect::to(303, "/test");
    redirect.set_cookie("session", login.user);
    Ok(redirect)
}

// GET /logout → 302 to /test, session cookie expired
async fn logout(_req: Request, _params: Params) -> Result<Redirect, Error> {
    let mut redirect = Redirect::to(302, "/test");
    redirect.unset_cookie("session");
    Ok(redirect)
}

// GET /report.csv → text/csv whatever the Accept header says
async fn report(_req: Request, _params: Params) -> Result<Raw, Error> {
    Ok(Raw::new("text/csv", "status,code\nok,200\n"))
}

// GET /healthz → raw route, no negotiation
async fn healthz(_req: Request, _params: Params) -> &'static str {
    "ok"
}
