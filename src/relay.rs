//! Prompt [`Relay`]: read one prompt, send it to a model and print what comes
//! back.
//!
//! The flow runs once: create the model handle, read a line, generate, render
//! exactly one [`Outcome`]. Every error is flattened to its message.

use std::{
    fmt::Display,
    future::Future,
    io::{self, BufRead, Write},
};

use crate::{client, response::TextError, GenerativeModel, Response};

/// Label printed before reading the prompt. No newline follows it.
pub const INPUT_LABEL: &str = "请输入你的提示: ";
/// Printed before the generated text.
pub const RESPONSE_HEADER: &str = "--- Gemini's Response ---";
/// Printed when nothing was generated.
pub const NO_CONTENT: &str = "--- 未能生成内容 ---";
/// Label for the prompt feedback line.
pub const PROMPT_FEEDBACK_LABEL: &str = "提示反馈";
/// Label for the finish reason line.
pub const FINISH_REASON_LABEL: &str = "完成原因";
/// Label for model construction failures.
pub const MODEL_INIT_ERROR_LABEL: &str = "初始化模型时出错";
/// Label for generation call failures.
pub const CALL_ERROR_LABEL: &str = "调用 Gemini API 时发生错误";

/// Something that can turn a prompt into a [`Response`]. Implemented for
/// [`GenerativeModel`]; tests use stubs.
pub trait Generate {
    /// Send `prompt` and wait for the reply.
    fn generate(
        &self,
        prompt: String,
    ) -> impl Future<Output = client::Result<Response>>;
}

impl<T> Generate for &T
where
    T: Generate + ?Sized,
{
    fn generate(
        &self,
        prompt: String,
    ) -> impl Future<Output = client::Result<Response>> {
        (**self).generate(prompt)
    }
}

impl Generate for GenerativeModel {
    fn generate(
        &self,
        prompt: String,
    ) -> impl Future<Output = client::Result<Response>> {
        self.generate_content(prompt)
    }
}

/// How a [`Relay::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Outcome {
    /// The model handle could not be created. Nothing was read or sent.
    ModelInitFailed,
    /// Text was generated and printed.
    Rendered,
    /// The reply had no content. Feedback was printed.
    Empty,
    /// The generation call failed. The error was printed.
    CallFailed,
}

impl Outcome {
    /// Whether the process should exit with a failure status.
    pub fn is_failure(&self) -> bool {
        self.is_model_init_failed()
    }
}

/// Reads the prompt from `input` and writes everything to `output`.
pub struct Relay<R, W> {
    input: R,
    output: W,
}

impl<R, W> Relay<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Create a relay over the given reader and writer.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Run the whole flow. `build` creates the model handle and is called
    /// first; if it fails the error is printed and nothing else happens.
    ///
    /// Only I/O errors on `input` or `output` are returned.
    pub async fn run<G, E, F>(&mut self, build: F) -> io::Result<Outcome>
    where
        F: FnOnce() -> Result<G, E>,
        E: Display,
        G: Generate,
    {
        let model = match build() {
            Ok(model) => model,
            Err(e) => {
                writeln!(self.output, "{}: {}", MODEL_INIT_ERROR_LABEL, e)?;
                self.output.flush()?;
                return Ok(Outcome::ModelInitFailed);
            }
        };

        let prompt = self.read_prompt()?;
        self.relay(&model, prompt).await
    }

    /// Print [`INPUT_LABEL`] and read one line. The line terminator is
    /// removed, nothing else. End of input is an [`UnexpectedEof`] error.
    ///
    /// [`UnexpectedEof`]: io::ErrorKind::UnexpectedEof
    pub fn read_prompt(&mut self) -> io::Result<String> {
        write!(self.output, "{}", INPUT_LABEL)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no prompt on standard input",
            ));
        }

        trim_line_ending(&mut line);
        Ok(line)
    }

    /// Send `prompt` to `model` and print the result.
    pub async fn relay<G>(
        &mut self,
        model: &G,
        prompt: String,
    ) -> io::Result<Outcome>
    where
        G: Generate,
    {
        let outcome = match model.generate(prompt).await {
            Ok(response) => self.render(&response)?,
            Err(e) => {
                writeln!(self.output, "{}: {}", CALL_ERROR_LABEL, e)?;
                Outcome::CallFailed
            }
        };

        self.output.flush()?;
        Ok(outcome)
    }

    /// Print a [`Response`]: the text if the first candidate has parts,
    /// otherwise the prompt feedback and, if there is a candidate, its finish
    /// reason. A part that is not text is printed as a call error.
    pub fn render(&mut self, response: &Response) -> io::Result<Outcome> {
        match response.text() {
            Ok(text) => {
                writeln!(self.output, "{}", RESPONSE_HEADER)?;
                writeln!(self.output, "{}", text)?;
                return Ok(Outcome::Rendered);
            }
            Err(TextError::NotText(e)) => {
                writeln!(self.output, "{}: {}", CALL_ERROR_LABEL, e)?;
                return Ok(Outcome::CallFailed);
            }
            Err(TextError::NoCandidates | TextError::NoParts) => {}
        }

        writeln!(self.output, "{}", NO_CONTENT)?;
        writeln!(
            self.output,
            "{}: {}",
            PROMPT_FEEDBACK_LABEL,
            response.prompt_feedback()
        )?;
        if let Some(candidate) = response.candidate() {
            writeln!(
                self.output,
                "{}: {}",
                FINISH_REASON_LABEL,
                candidate.finish_reason()
            )?;
        }

        Ok(Outcome::Empty)
    }
}

/// Remove one trailing `\n` or `\r\n`.
fn trim_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, io::Cursor};

    use super::*;
    use crate::{
        client::{ApiError, Status},
        response::{BlockReason, Candidate, FinishReason, PromptFeedback},
        Content, Part,
    };

    /// Returns a canned reply and remembers the prompts it got.
    struct Stub {
        reply: RefCell<Option<client::Result<Response>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl Stub {
        fn new(reply: client::Result<Response>) -> Self {
            Self {
                reply: RefCell::new(Some(reply)),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl Generate for Stub {
        fn generate(
            &self,
            prompt: String,
        ) -> impl Future<Output = client::Result<Response>> {
            self.prompts.borrow_mut().push(prompt);
            let reply = self.reply.borrow_mut().take().expect("called twice");
            async move { reply }
        }
    }

    fn text_response(parts: &[&str]) -> Response {
        Response {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some(crate::content::Role::Model),
                    parts: parts.iter().map(|&p| Part::text(p)).collect(),
                }),
                finish_reason: Some(FinishReason::Stop),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn blocked_feedback() -> PromptFeedback {
        PromptFeedback {
            block_reason: Some(BlockReason::Safety),
            safety_ratings: Vec::new(),
        }
    }

    /// Run with `input` on stdin and the stub built by `build`. Returns the
    /// outcome, what was printed and how much input was left unread.
    async fn run<F>(input: &str, build: F) -> (Outcome, String, usize)
    where
        F: FnOnce() -> Result<Stub, String>,
    {
        let mut relay = Relay::new(Cursor::new(input.as_bytes()), Vec::new());
        let outcome = relay.run(build).await.unwrap();
        let (input, output) = relay.into_inner();
        let unread = input.get_ref().len() - input.position() as usize;
        (outcome, String::from_utf8(output).unwrap(), unread)
    }

    #[tokio::test]
    async fn test_hello() {
        let stub = Stub::new(Ok(text_response(&["Hello!"])));
        let mut relay = Relay::new(Cursor::new("hi\n"), Vec::new());

        let outcome = relay.run(|| Ok::<_, String>(&stub)).await.unwrap();
        let (_, output) = relay.into_inner();

        assert_eq!(outcome, Outcome::Rendered);
        assert_eq!(stub.prompts.borrow().as_slice(), ["hi"]);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            format!("{INPUT_LABEL}{RESPONSE_HEADER}\nHello!\n")
        );
    }

    #[tokio::test]
    async fn test_parts_are_concatenated() {
        let (outcome, output, _) = run("hi\n", || {
            Ok(Stub::new(Ok(text_response(&["Hello", ", ", "world!"]))))
        })
        .await;

        assert!(outcome.is_rendered());
        assert!(output.ends_with(&format!("{RESPONSE_HEADER}\nHello, world!\n")));
    }

    #[tokio::test]
    async fn test_model_init_failure_reads_nothing() {
        let (outcome, output, unread) =
            run("hi\n", || Err("model name is empty".to_string())).await;

        assert_eq!(outcome, Outcome::ModelInitFailed);
        assert!(outcome.is_failure());
        assert_eq!(output, format!("{MODEL_INIT_ERROR_LABEL}: model name is empty\n"));
        // The prompt label was never shown and stdin was not touched.
        assert!(!output.contains(INPUT_LABEL));
        assert_eq!(unread, 3);
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let response = Response {
            prompt_feedback: Some(blocked_feedback()),
            ..Default::default()
        };
        let (outcome, output, _) =
            run("hi\n", || Ok(Stub::new(Ok(response)))).await;

        assert_eq!(outcome, Outcome::Empty);
        assert_eq!(
            output,
            format!(
                "{INPUT_LABEL}{NO_CONTENT}\n{PROMPT_FEEDBACK_LABEL}: block_reason: SAFETY\n"
            )
        );
        assert!(!output.contains(FINISH_REASON_LABEL));
        assert!(!output.contains(RESPONSE_HEADER));
    }

    #[tokio::test]
    async fn test_candidate_without_parts() {
        let response = Response {
            candidates: vec![Candidate {
                content: None,
                finish_reason: Some(FinishReason::Safety),
                ..Default::default()
            }],
            prompt_feedback: None,
            ..Default::default()
        };
        let (outcome, output, _) =
            run("hi\n", || Ok(Stub::new(Ok(response)))).await;

        assert!(outcome.is_empty());
        assert_eq!(
            output,
            format!(
                "{INPUT_LABEL}{NO_CONTENT}\n{PROMPT_FEEDBACK_LABEL}: \n{FINISH_REASON_LABEL}: SAFETY\n"
            )
        );
    }

    #[tokio::test]
    async fn test_candidate_with_empty_parts() {
        let mut response = text_response(&[]);
        response.candidates[0].finish_reason = Some(FinishReason::MaxTokens);
        response.prompt_feedback = Some(blocked_feedback());

        let (outcome, output, _) =
            run("hi\n", || Ok(Stub::new(Ok(response)))).await;

        assert!(outcome.is_empty());
        assert!(output.contains(NO_CONTENT));
        assert!(output
            .contains(&format!("{PROMPT_FEEDBACK_LABEL}: block_reason: SAFETY\n")));
        assert!(output.contains(&format!("{FINISH_REASON_LABEL}: MAX_TOKENS\n")));
    }

    #[tokio::test]
    async fn test_call_failure() {
        let error = client::Error::Api(ApiError {
            code: 503,
            message: "The model is overloaded.".into(),
            status: Status::Unavailable,
        });
        let (outcome, output, _) =
            run("hi\n", || Ok(Stub::new(Err(error)))).await;

        assert_eq!(outcome, Outcome::CallFailed);
        assert!(!outcome.is_failure());
        assert_eq!(
            output,
            format!(
                "{INPUT_LABEL}{CALL_ERROR_LABEL}: Google API error: UNAVAILABLE (503): The model is overloaded.\n"
            )
        );
        assert!(!output.contains(RESPONSE_HEADER));
        assert!(!output.contains(NO_CONTENT));
    }

    #[tokio::test]
    async fn test_function_call_part_is_call_error() {
        let response: Response = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[
                {"functionCall":{"name":"get_weather","args":{"city":"Paris"}}}
            ]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        let (outcome, output, _) =
            run("hi\n", || Ok(Stub::new(Ok(response)))).await;

        assert_eq!(outcome, Outcome::CallFailed);
        assert!(!outcome.is_failure());
        assert_eq!(
            output,
            format!(
                "{INPUT_LABEL}{CALL_ERROR_LABEL}: Could not convert `part.function_call` to text.\n"
            )
        );
        assert!(!output.contains(RESPONSE_HEADER));
    }

    #[tokio::test]
    async fn test_unknown_finish_reason() {
        let response: Response = serde_json::from_str(
            r#"{"candidates":[{"finishReason":"IMAGE_SAFETY","index":0}]}"#,
        )
        .unwrap();
        let (outcome, output, _) =
            run("hi\n", || Ok(Stub::new(Ok(response)))).await;

        assert!(outcome.is_empty());
        assert!(output.ends_with(&format!(
            "{FINISH_REASON_LABEL}: FINISH_REASON_UNSPECIFIED\n"
        )));
    }

    #[tokio::test]
    async fn test_prompt_is_verbatim() {
        let stub = Stub::new(Ok(text_response(&["ok"])));
        let mut relay =
            Relay::new(Cursor::new("  spaced out \t\r\nsecond line\n"), Vec::new());

        relay.run(|| Ok::<_, String>(&stub)).await.unwrap();

        assert_eq!(stub.prompts.borrow().as_slice(), ["  spaced out \t"]);
    }

    #[tokio::test]
    async fn test_prompt_without_newline() {
        let stub = Stub::new(Ok(text_response(&["ok"])));
        let mut relay = Relay::new(Cursor::new("last line"), Vec::new());

        relay.run(|| Ok::<_, String>(&stub)).await.unwrap();

        assert_eq!(stub.prompts.borrow().as_slice(), ["last line"]);
    }

    #[tokio::test]
    async fn test_end_of_input() {
        let stub = Stub::new(Ok(text_response(&["unused"])));
        let mut relay = Relay::new(Cursor::new(""), Vec::new());

        let err = relay.run(|| Ok::<_, String>(&stub)).await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(stub.prompts.borrow().is_empty());
    }

    #[test]
    fn test_trim_line_ending() {
        for (input, expected) in [
            ("a\n", "a"),
            ("a\r\n", "a"),
            ("a", "a"),
            ("a\r", "a\r"),
            ("\n", ""),
            ("a\n\n", "a\n"),
        ] {
            let mut line = input.to_string();
            trim_line_ending(&mut line);
            assert_eq!(line, expected, "input: {input:?}");
        }
    }
}
