//! Integration tests for the audio update WebSocket

mod test_utils;

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use futures_util::{SinkExt, Stream, StreamExt};
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message;

    use twitchgpt::config::GptMode;

    use crate::test_utils::test_app;

    async fn next_text<S>(socket: &mut S) -> String
    where
        S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("socket error");
        frame.into_text().unwrap().as_str().to_owned()
    }

    /// Every connected client gets the update and inbound chatter is ignored
    #[tokio::test]
    async fn it_pushes_updates_to_every_client() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _, notifier) = test_app("http://127.0.0.1:9", GptMode::Chat, dir.path());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let url = format!("ws://{addr}/check-for-updates");
        let (mut first, _) = connect_async(url.as_str()).await.unwrap();
        let (mut second, _) = connect_async(url.as_str()).await.unwrap();

        first.send(Message::Text("hello?".into())).await.unwrap();
        // Give the server a moment to read and drop the inbound frame.
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(notifier.notify(), 2);

        assert_eq!(next_text(&mut first).await, r#"{"updated":true}"#);
        assert_eq!(next_text(&mut second).await, r#"{"updated":true}"#);
    }
}
