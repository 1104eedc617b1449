#![forbid(unsafe_code)]

use std::time::Duration;

use reversi_p2p_lib::net::line::{LineTransport, MAX_LINE_LEN};
use reversi_p2p_lib::GameError;
use tokio::io::{duplex, AsyncWriteExt};

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::test]
async fn line_round_trip_is_verbatim() -> TestResult<()> {
    let (a, b) = duplex(4096);
    let mut tx = LineTransport::with_timeout(a, Duration::from_secs(1));
    let mut rx = LineTransport::with_timeout(b, Duration::from_secs(1));

    tx.send_line("MOVE:2,3").await?;
    assert_eq!(rx.recv_line().await?, "MOVE:2,3");

    tx.send_line("").await?;
    assert_eq!(rx.recv_line().await?, "");
    Ok(())
}

#[tokio::test]
async fn crlf_and_lf_terminators_both_accepted() -> TestResult<()> {
    let (mut a, b) = duplex(4096);
    let mut rx = LineTransport::with_timeout(b, Duration::from_secs(1));

    a.write_all(b"PASS\r\nDRAW\n").await?;
    assert_eq!(rx.recv_line().await?, "PASS");
    assert_eq!(rx.recv_line().await?, "DRAW");
    Ok(())
}

#[tokio::test]
async fn two_lines_in_one_write_are_split() -> TestResult<()> {
    let (a, b) = duplex(4096);
    let mut tx = LineTransport::with_timeout(a, Duration::from_secs(1));
    let mut rx = LineTransport::with_timeout(b, Duration::from_secs(1));

    tx.send_line("MOVE:2,3").await?;
    tx.send_line("PASS").await?;
    assert_eq!(rx.recv_line().await?, "MOVE:2,3");
    assert_eq!(rx.recv_line().await?, "PASS");
    Ok(())
}

#[tokio::test]
async fn line_split_across_writes_is_coalesced() -> TestResult<()> {
    let (mut a, b) = duplex(4096);
    let mut rx = LineTransport::with_timeout(b, Duration::from_secs(2));

    a.write_all(b"MO").await?;
    let reader = tokio::spawn(async move { rx.recv_line().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    a.write_all(b"VE:2,3\n").await?;

    assert_eq!(reader.await??, "MOVE:2,3");
    Ok(())
}

#[tokio::test]
async fn oversized_line_fails_instead_of_growing() -> TestResult<()> {
    let (mut a, b) = duplex(8192);
    let mut rx = LineTransport::with_timeout(b, Duration::from_secs(1));

    a.write_all(&vec![b'x'; MAX_LINE_LEN + 200]).await?;
    let err = rx.recv_line().await.unwrap_err();
    assert!(matches!(err, GameError::Protocol(_)));
    assert!(err.to_string().contains("max length"));
    Ok(())
}

#[tokio::test]
async fn send_rejects_embedded_cr_lf_without_touching_the_stream() -> TestResult<()> {
    let (a, b) = duplex(4096);
    let mut tx = LineTransport::with_timeout(a, Duration::from_secs(1));
    let mut rx = LineTransport::with_timeout(b, Duration::from_millis(100));

    assert!(tx.send_line("bad\nline").await.is_err());
    assert!(tx.send_line("bad\rline").await.is_err());

    // Nothing reached the wire, so the read times out.
    let err = rx.recv_line().await.unwrap_err();
    assert!(err.to_string().contains("timed out"));
    Ok(())
}

#[tokio::test]
async fn peer_close_surfaces_as_protocol_error() -> TestResult<()> {
    let (a, b) = duplex(4096);
    drop(a);
    let mut rx = LineTransport::with_timeout(b, Duration::from_secs(1));

    let err = rx.recv_line().await.unwrap_err();
    assert!(err.to_string().contains("closed"));
    Ok(())
}

#[tokio::test]
async fn recv_times_out_on_a_silent_peer() -> TestResult<()> {
    let (_a, b) = duplex(4096);
    let mut rx = LineTransport::with_timeout(b, Duration::from_millis(100));

    let err = rx.recv_line().await.unwrap_err();
    assert!(err.to_string().contains("timed out"));
    Ok(())
}

#[tokio::test]
async fn close_is_idempotent() -> TestResult<()> {
    let (a, _b) = duplex(4096);
    let mut tx = LineTransport::new(a);
    tx.close().await;
    tx.close().await;
    Ok(())
}
