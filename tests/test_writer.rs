use httpwire::http::headers::Headers;
use httpwire::http::response::{default_headers, StatusCode};
use httpwire::http::writer::{ResponseWriter, WriteError, WriteState};

fn output(writer: ResponseWriter<Vec<u8>>) -> String {
    String::from_utf8(writer.into_inner()).unwrap()
}

#[tokio::test]
async fn test_write_simple_response() {
    let mut writer = ResponseWriter::new(Vec::new());

    let mut headers = Headers::new();
    headers.set("Content-Length", "5").unwrap();
    headers.set("Connection", "close").unwrap();
    headers.set("Content-Type", "text/plain").unwrap();

    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&headers).await.unwrap();
    let n = writer.write_body(b"hello").await.unwrap();

    assert_eq!(n, 5);
    assert_eq!(writer.state(), WriteState::BodyWritten);
    assert_eq!(
        output(writer),
        "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\nContent-Type: text/plain\r\n\r\nhello"
    );
}

#[tokio::test]
async fn test_write_status_line_variants() {
    for (status, expected) in [
        (StatusCode::OK, "HTTP/1.1 200 OK\r\n"),
        (StatusCode::BAD_REQUEST, "HTTP/1.1 400 Bad Request\r\n"),
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "HTTP/1.1 500 Internal Server Error\r\n",
        ),
        (StatusCode(299), "HTTP/1.1 299 \r\n"),
    ] {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_status_line(status).await.unwrap();

        assert_eq!(writer.state(), WriteState::StatusLineWritten);
        assert_eq!(output(writer), expected);
    }
}

#[tokio::test]
async fn test_body_before_headers_fails_and_writes_nothing() {
    let mut writer = ResponseWriter::new(Vec::new());

    let result = writer.write_body(b"hello").await;

    assert!(matches!(
        result,
        Err(WriteError::OutOfOrder {
            state: WriteState::NothingWritten,
            ..
        })
    ));
    assert_eq!(writer.state(), WriteState::NothingWritten);
    assert!(writer.get_ref().is_empty());
}

#[tokio::test]
async fn test_headers_before_status_line_fails() {
    let mut writer = ResponseWriter::new(Vec::new());

    let result = writer.write_headers(&default_headers(0)).await;

    assert!(matches!(result, Err(WriteError::OutOfOrder { .. })));
    assert!(writer.get_ref().is_empty());
}

#[tokio::test]
async fn test_status_line_twice_fails() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::OK).await.unwrap();

    let result = writer.write_status_line(StatusCode::OK).await;

    assert!(matches!(
        result,
        Err(WriteError::OutOfOrder {
            state: WriteState::StatusLineWritten,
            ..
        })
    ));
    assert_eq!(output(writer), "HTTP/1.1 200 OK\r\n");
}

#[tokio::test]
async fn test_body_after_body_fails() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();
    writer.write_body(b"one").await.unwrap();

    let result = writer.write_body(b"two").await;

    assert!(matches!(result, Err(WriteError::OutOfOrder { .. })));
    assert_eq!(output(writer), "HTTP/1.1 200 OK\r\n\r\none");
}

#[tokio::test]
async fn test_write_chunked_body_frames() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();
    let prefix_len = writer.get_ref().len();

    assert_eq!(writer.write_chunked_body(b"abc").await.unwrap(), 3);
    assert_eq!(writer.write_chunked_body(b"de").await.unwrap(), 2);
    assert_eq!(writer.state(), WriteState::HeaderWritten);
    writer.write_chunked_body_done().await.unwrap();

    assert_eq!(writer.state(), WriteState::ChunkedBodyDone);
    assert_eq!(&writer.get_ref()[prefix_len..], b"3\r\nabc\r\n2\r\nde\r\n0\r\n");
}

#[tokio::test]
async fn test_chunk_length_is_hex() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();
    let prefix_len = writer.get_ref().len();

    writer.write_chunked_body(&[b'x'; 255]).await.unwrap();

    assert!(writer.get_ref()[prefix_len..].starts_with(b"ff\r\nxxx"));
}

#[tokio::test]
async fn test_empty_chunk_writes_nothing() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();
    let before = writer.get_ref().len();

    assert_eq!(writer.write_chunked_body(b"").await.unwrap(), 0);
    assert_eq!(writer.get_ref().len(), before);
}

#[tokio::test]
async fn test_chunked_response_with_trailers() {
    let mut writer = ResponseWriter::new(Vec::new());

    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.set("Transfer-Encoding", "chunked").unwrap();
    headers.set("Trailer", "X-Content-Length").unwrap();

    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&headers).await.unwrap();
    writer.write_chunked_body(b"hello").await.unwrap();
    writer.write_chunked_body_done().await.unwrap();

    let mut trailers = Headers::new();
    trailers.set("X-Content-Length", "5").unwrap();
    writer.write_trailers(&trailers).await.unwrap();

    assert_eq!(writer.state(), WriteState::TrailersWritten);
    assert_eq!(
        output(writer),
        "HTTP/1.1 200 OK\r\n\
         Connection: close\r\n\
         Content-Type: text/plain\r\n\
         Transfer-Encoding: chunked\r\n\
         Trailer: X-Content-Length\r\n\
         \r\n\
         5\r\nhello\r\n\
         0\r\n\
         X-Content-Length: 5\r\n\
         \r\n"
    );
}

#[tokio::test]
async fn test_empty_trailers_end_message() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();
    writer.write_chunked_body_done().await.unwrap();
    writer.write_trailers(&Headers::new()).await.unwrap();

    assert!(output(writer).ends_with("\r\n\r\n0\r\n\r\n"));
}

#[tokio::test]
async fn test_chunk_after_done_fails() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();
    writer.write_chunked_body_done().await.unwrap();
    let before = writer.get_ref().len();

    let result = writer.write_chunked_body(b"late").await;

    assert!(matches!(
        result,
        Err(WriteError::OutOfOrder {
            state: WriteState::ChunkedBodyDone,
            ..
        })
    ));
    assert_eq!(writer.get_ref().len(), before);
}

#[tokio::test]
async fn test_trailers_before_chunk_done_fails() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();

    let result = writer.write_trailers(&Headers::new()).await;

    assert!(matches!(result, Err(WriteError::OutOfOrder { .. })));
    assert_eq!(writer.state(), WriteState::HeaderWritten);
}

#[tokio::test]
async fn test_chunks_after_plain_body_fail() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();
    writer.write_body(b"x").await.unwrap();

    assert!(writer.write_chunked_body(b"y").await.is_err());
    assert!(writer.write_chunked_body_done().await.is_err());
}

#[test]
fn test_out_of_order_error_message() {
    let err = WriteError::OutOfOrder {
        operation: "write body",
        state: WriteState::NothingWritten,
    };

    assert_eq!(
        err.to_string(),
        "incorrect write order: cannot write body in state NothingWritten"
    );
}

#[tokio::test]
async fn test_rejected_value_never_reaches_the_wire() {
    let mut writer = ResponseWriter::new(Vec::new());

    let mut headers = Headers::new();
    headers.set("X-Ok", "a").unwrap();
    assert!(headers.set("X-Ok", "b\r\nInjected: yes").is_err());

    writer.write_status_line(StatusCode::OK).await.unwrap();
    writer.write_headers(&headers).await.unwrap();

    assert_eq!(output(writer), "HTTP/1.1 200 OK\r\nX-Ok: a\r\n\r\n");
}
