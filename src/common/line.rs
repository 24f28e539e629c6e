use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    Eof,
    Text(String),
    TooLong,
}

/// Reads one `\n`-terminated line, buffering at most `max + 1` bytes.
pub async fn read_bounded_line<R>(reader: &mut R, max: usize) -> std::io::Result<Line>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader).take(max as u64 + 1).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(Line::Eof);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.len() > max {
        return Ok(Line::TooLong);
    }
    Ok(Line::Text(String::from_utf8_lossy(&buf).into_owned()))
}

/// Skips input up to and including the next `\n` without buffering it.
pub async fn discard_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (used, done) = {
            let buf = reader.fill_buf().await?;
            match buf.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (buf.len(), buf.is_empty()),
            }
        };
        reader.consume(used);
        if done {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn splits_lines_and_stops_at_eof() {
        let mut reader = BufReader::new(&b"PING\nUID"[..]);

        assert_eq!(read_bounded_line(&mut reader, 8).await.unwrap(), Line::Text("PING".into()));
        assert_eq!(read_bounded_line(&mut reader, 8).await.unwrap(), Line::Text("UID".into()));
        assert_eq!(read_bounded_line(&mut reader, 8).await.unwrap(), Line::Eof);
    }

    #[tokio::test]
    async fn overlong_line_is_cut_at_the_limit() {
        let data = vec![b'a'; 4096];
        let mut reader = BufReader::new(&data[..]);

        assert_eq!(read_bounded_line(&mut reader, 16).await.unwrap(), Line::TooLong);
        // exactly the limit is still fine
        let mut exact = BufReader::new(&b"0123456789abcdef\n"[..]);
        assert!(matches!(read_bounded_line(&mut exact, 16).await.unwrap(), Line::Text(_)));
    }

    #[tokio::test]
    async fn discard_resumes_at_next_line() {
        let mut data = vec![b'a'; 4096];
        data.extend_from_slice(b"\nPING\n");
        let mut reader = BufReader::new(&data[..]);

        assert_eq!(read_bounded_line(&mut reader, 16).await.unwrap(), Line::TooLong);
        discard_line(&mut reader).await.unwrap();
        assert_eq!(read_bounded_line(&mut reader, 16).await.unwrap(), Line::Text("PING".into()));
    }
}
