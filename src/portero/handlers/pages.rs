//! Minimal HTML pages. The interesting behavior lives in the guard and the
//! form actions; these exist so every route in the table resolves.

use axum::response::Html;

pub async fn home() -> Html<&'static str> {
    Html(
        "<!doctype html><title>portero</title>\
         <h1>portero</h1>\
         <p><a href=\"/login\">Log in</a> or <a href=\"/register\">register</a>.</p>",
    )
}

pub async fn login() -> Html<&'static str> {
    Html(
        "<!doctype html><title>Log in</title>\
         <form method=\"post\" action=\"/login\">\
         <input name=\"email\" type=\"email\" placeholder=\"Email\">\
         <input name=\"password\" type=\"password\" placeholder=\"Password\">\
         <button type=\"submit\">Log in</button>\
         </form>",
    )
}

pub async fn register() -> Html<&'static str> {
    Html(
        "<!doctype html><title>Register</title>\
         <form method=\"post\" action=\"/register\">\
         <input name=\"email\" type=\"email\" placeholder=\"Email\">\
         <input name=\"password\" type=\"password\" placeholder=\"Password\">\
         <input name=\"confirm_password\" type=\"password\" placeholder=\"Confirm password\">\
         <button type=\"submit\">Register</button>\
         </form>",
    )
}

pub async fn dashboard() -> Html<&'static str> {
    Html(
        "<!doctype html><title>Dashboard</title>\
         <h1>Dashboard</h1>\
         <form method=\"post\" action=\"/logout\">\
         <button type=\"submit\">Log out</button>\
         </form>",
    )
}
