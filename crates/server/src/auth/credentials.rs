use http::HeaderMap;
use secrecy::SecretString;

const CLIENT_ID_HEADERS: [&str; 2] = ["client_id", "client-id"];
const CLIENT_SECRET_HEADERS: [&str; 2] = ["client_secret", "client-secret"];

pub(super) struct Credentials {
    pub client_id: String,
    pub secret: SecretString,
}

/// Reads the client id and secret headers. Both the underscore and the hyphen spelling are
/// accepted, since some proxies drop headers containing underscores.
pub(super) fn extract(headers: &HeaderMap) -> Option<Credentials> {
    let client_id = first_header(headers, &CLIENT_ID_HEADERS)?;
    let secret = first_header(headers, &CLIENT_SECRET_HEADERS)?;

    Some(Credentials {
        client_id: client_id.to_string(),
        secret: SecretString::from(secret.to_string()),
    })
}

fn first_header<'a>(headers: &'a HeaderMap, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
}
