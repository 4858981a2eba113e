use std::io::Write;

use futures::StreamExt;
use termion::{clear, color, style};

use futures_util::FutureExt;

const SPINNER: [char; 3] = ['-', '/', '\\'];

pub struct Spinner {
    pos: usize,
}

impl Spinner {
    pub fn new() -> Spinner {
        Spinner { pos: 0 }
    }

    pub fn next(&mut self) -> char {
        let ch = SPINNER[self.pos];
        self.pos = (self.pos + 1) % SPINNER.len();
        ch
    }
}

#[async_trait::async_trait]
pub trait WithSpinner
where
    Self: futures::Future + Sized,
{
    async fn with_spinner(self, text: impl AsRef<str> + Send) -> Self::Output;
}

#[async_trait::async_trait]
impl<T: futures::Future + Send> WithSpinner for T {
    async fn with_spinner(self, text: impl AsRef<str> + Send) -> Self::Output {
        // Drawn on stderr so it never mixes with what the command prints
        if !termion::is_tty(&std::io::stderr()) {
            return self.await;
        }
        spin_on(self, text.as_ref(), std::io::stderr()).await
    }
}

async fn spin_on<F, W>(fut: F, text: &str, mut out: W) -> F::Output
where
    F: futures::Future + Send,
    W: Write + Send,
{
    let fut = Box::pin(fut);
    let mut spinner = Spinner::new();
    let mut stream = fut.into_stream();
    loop {
        if let Some(Some(result)) = stream.next().now_or_never() {
            return result;
        }

        write!(
            out,
            "[{}{}{}] {}\r",
            color::Fg(color::Blue),
            spinner.next(),
            style::Reset,
            text,
        )
        .ok();
        out.flush().ok();

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        write!(out, "{}", clear::AfterCursor).ok();
        out.flush().ok();
    }
}
