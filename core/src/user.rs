//! The authenticated user.

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::http::Transport;
use crate::types::{nullable, User};

#[derive(Deserialize, Default)]
#[serde(default)]
struct UserInfo {
    #[serde(deserialize_with = "nullable")]
    user: User,
}

/// Retrieve the authenticated user's account and blogs.
pub fn get_user_info(transport: &dyn Transport) -> Result<User> {
    let response = transport.get("/user/info")?;
    let info: UserInfo = response.decode()?;
    debug!(user = %info.user.name, blogs = info.user.blogs.len(), "fetched user info");
    Ok(info.user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, TransportError};
    use crate::testing::RecordingTransport;

    #[test]
    fn get_user_info_with_error() {
        let transport = RecordingTransport::failing(TransportError::Request("Mock error".to_string()));
        assert!(matches!(get_user_info(&transport), Err(ApiError::Transport(_))));
    }

    #[test]
    fn get_user_info_with_bad_json() {
        let transport = RecordingTransport::ok("{");
        assert!(matches!(get_user_info(&transport), Err(ApiError::Decode(_))));
    }

    #[test]
    fn get_user_info_decodes_user() {
        let transport = RecordingTransport::ok(
            r#"{"meta":{"status":200},"response":{"user":{"name":"david","following":12,"likes":3,
            "default_post_format":"html","blogs":[{"name":"david","primary":true,"followers":9}]}}}"#,
        );
        let user = get_user_info(&transport).unwrap();
        assert_eq!(user.name, "david");
        assert_eq!(user.following, 12);
        assert_eq!(user.likes, 3);
        assert_eq!(user.blogs.len(), 1);
        assert!(user.blogs[0].is_primary);
        assert_eq!(transport.last_call().unwrap().path, "/user/info");
    }

    #[test]
    fn missing_user_decodes_to_default() {
        let transport = RecordingTransport::ok(r#"{"response":{}}"#);
        assert_eq!(get_user_info(&transport).unwrap(), User::default());
    }
}
