//! Blocking HTTP server
//!
//! Requests are served one at a time on the calling thread.

use anyhow::{Result, anyhow};
use log::{info, warn};
use tiny_http::{Header, Request, Response, Server, StatusCode};

use crate::routes::{App, HttpResponse};

/// Bind the listening socket
pub fn bind(address: &str) -> Result<Server> {
    let server =
        Server::http(address).map_err(|e| anyhow!("Failed to bind HTTP server on {}: {}", address, e))?;
    info!("Listening on http://{}", address);
    Ok(server)
}

/// Serve requests until the server is shut down
pub fn serve(app: &App, server: &Server) {
    for request in server.incoming_requests() {
        handle_request(app, request);
    }
}

fn handle_request(app: &App, request: Request) {
    let method = request.method().to_string();
    let target = request.url().to_string();

    let response = app.handle(&method, &target);

    // The query string can carry OAuth codes, so only the path is logged
    let path = target.split('?').next().unwrap_or_default();
    info!("{} {} -> {}", method, path, response.status);

    if let Err(e) = request.respond(into_tiny_response(response)) {
        warn!("Failed to send response for {}: {}", path, e);
    }
}

fn into_tiny_response(response: HttpResponse) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut reply = Response::from_data(response.body).with_status_code(StatusCode(response.status));

    if let Some(content_type) = response.content_type
        && let Ok(header) = Header::from_bytes("Content-Type", content_type)
    {
        reply.add_header(header);
    }
    if let Some(location) = response.location
        && let Ok(header) = Header::from_bytes("Location", location)
    {
        reply.add_header(header);
    }

    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StaticMailbox, make_app, signed_in};
    use std::io::{Read, Write};
    use std::net::TcpStream;

    /// Send one raw HTTP request through a real socket and return the raw reply
    fn round_trip(app: &App, request_line: &str) -> String {
        let server = bind("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                let request = server.recv().unwrap();
                handle_request(app, request);
            });

            let mut stream = TcpStream::connect(addr).unwrap();
            write!(stream, "{}\r\nHost: localhost\r\nConnection: close\r\n\r\n", request_line).unwrap();
            let mut reply = String::new();
            stream.read_to_string(&mut reply).unwrap();
            reply
        })
    }

    #[test]
    fn test_search_over_socket() {
        let (app, _) = make_app(signed_in(), StaticMailbox { fail_with: None });
        let reply = round_trip(&app, "GET /search?query=hello HTTP/1.1");

        assert!(reply.starts_with("HTTP/1.1 200"));
        assert!(reply.contains("Content-Type: application/json"));
        assert!(reply.contains("\"subject\":\"Hello\""));
    }

    #[test]
    fn test_redirect_over_socket() {
        let (app, _) = make_app(None, StaticMailbox { fail_with: None });
        let reply = round_trip(&app, "GET /search?query=hello HTTP/1.1");

        assert!(reply.starts_with("HTTP/1.1 302"));
        assert!(reply.contains("Location: https://accounts.google.com/"));
    }
}
