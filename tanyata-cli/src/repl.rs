//! Line-oriented chat loop

use std::io::{self, BufRead, Write};

use tanyata_lib::chat::{Assistant, ChatSession, Role};
use tanyata_lib::embed::Embedder;
use tanyata_lib::generate::Generator;
use tanyata_lib::store::VectorStore;

pub const TITLE: &str = "Bot Tanya Jawab Tugas Akhir";
const SUBTITLE: &str = "Ajukan pertanyaan apa pun tentang isi Tugas Akhir ini! (ketik 'exit' untuk keluar)";
const BAD_INPUT: &str = "Masukan bukan teks UTF-8 yang valid, silakan ulangi.";
const PROMPT: &str = "> ";

/// Read questions from `input` until EOF or `exit`/`quit`.
///
/// Answers go to `out`. A failed turn or an undecodable line is reported on
/// `err` and the loop moves on to the next question.
pub async fn run<E, S, G, R, W, X>(
    assistant: &mut Assistant<E, S, G>,
    session: &mut ChatSession,
    input: R,
    out: &mut W,
    err: &mut X,
) -> anyhow::Result<()>
where
    E: Embedder,
    S: VectorStore,
    G: Generator,
    R: BufRead,
    W: Write,
    X: Write,
{
    writeln!(out, "{TITLE}")?;
    writeln!(out, "{SUBTITLE}")?;

    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!(error = %e, "skipping undecodable input line");
                writeln!(err, "{BAD_INPUT}")?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        session.push(Role::User, question);
        match assistant.ask(question).await {
            Ok(answer) => {
                writeln!(out, "{}", answer.text)?;
                writeln!(out, "Waktu respons: {:.2} detik", answer.elapsed.as_secs_f64())?;
                session.push(Role::Assistant, answer.text);
            }
            Err(e) => {
                tracing::error!(error = %e, "turn failed");
                writeln!(err, "Gagal menjawab: {e}")?;
            }
        }
    }

    tracing::info!(turns = session.len(), "chat session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tanyata_lib::chunk::RecursiveChunker;
    use tanyata_lib::document::Document;
    use tanyata_lib::embed::Embedding;
    use tanyata_lib::prompt::PromptTemplate;
    use tanyata_lib::search::Retriever;
    use tanyata_lib::store::MemoryStore;
    use tanyata_lib::{Error, Result};

    /// Counts letters a to e.
    struct LetterEmbedder;

    impl Embedder for LetterEmbedder {
        fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
            texts.iter().map(|t| self.embed_query(t)).collect()
        }

        fn embed_query(&mut self, text: &str) -> Result<Embedding> {
            Ok(['a', 'b', 'c', 'd', 'e']
                .iter()
                .map(|l| text.chars().filter(|c| c == l).count() as f32 + 0.1)
                .collect())
        }

        fn dimension(&self) -> usize {
            5
        }

        fn model_name(&self) -> &str {
            "letters"
        }

        fn normalized(&self) -> bool {
            false
        }
    }

    struct Echo;

    #[async_trait]
    impl Generator for Echo {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok("Jawaban dari dokumen.".to_string())
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    /// Fails on prompts mentioning "gagal".
    struct Picky;

    #[async_trait]
    impl Generator for Picky {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains("gagal") {
                return Err(Error::Generation {
                    status: Some(503),
                    message: "service unavailable".to_string(),
                });
            }
            Ok("oke".to_string())
        }

        fn model_name(&self) -> &str {
            "picky"
        }
    }

    fn assistant<G: Generator>(generator: G) -> Assistant<LetterEmbedder, MemoryStore, G> {
        let chunker = RecursiveChunker::new(40, 5, vec!["\n".to_string(), String::new()]).unwrap();
        let doc = Document::from_text("ta.txt", "abba cab\ndeed bead\nace dab\n");
        let mut retriever = Retriever::new(LetterEmbedder, MemoryStore::new());
        retriever.index(&doc.chunk_with(&chunker)).unwrap();
        Assistant::new(retriever, PromptTemplate::default(), generator, 2)
    }

    async fn drive<G: Generator>(generator: G, input: &str) -> (ChatSession, String, String) {
        let mut assistant = assistant(generator);
        let mut session = ChatSession::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        run(&mut assistant, &mut session, input.as_bytes(), &mut out, &mut err)
            .await
            .unwrap();
        (
            session,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_answers_each_question() {
        let (session, out, err) = drive(Echo, "Apa judulnya?\n\n   \nSiapa penulisnya?\n").await;

        assert!(out.starts_with(TITLE));
        assert_eq!(out.matches("Jawaban dari dokumen.").count(), 2);
        assert_eq!(out.matches("Waktu respons: ").count(), 2);
        assert!(err.is_empty());

        let roles: Vec<Role> = session.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(session.turns()[2].text, "Siapa penulisnya?");
    }

    #[tokio::test]
    async fn test_exit_stops_reading() {
        let (session, _, _) = drive(Echo, "satu\nexit\ndua\n").await;
        assert_eq!(session.len(), 2);

        let (session, _, _) = drive(Echo, "quit\n").await;
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_session_going() {
        let (session, out, err) = drive(Picky, "ini gagal\nini berhasil\n").await;

        assert_eq!(
            err.trim_end(),
            "Gagal menjawab: generation failed (HTTP 503): service unavailable"
        );
        assert_eq!(out.matches("Waktu respons: ").count(), 1);

        let turns = session.turns();
        assert_eq!(turns.len(), 3);
        assert_eq!((turns[0].role, turns[0].text.as_str()), (Role::User, "ini gagal"));
        assert_eq!(turns[1].role, Role::User);
        assert_eq!((turns[2].role, turns[2].text.as_str()), (Role::Assistant, "oke"));
    }

    #[tokio::test]
    async fn test_undecodable_line_is_skipped() {
        let mut assistant = assistant(Echo);
        assert_eq!(assistant.top_k(), 2);

        let mut session = ChatSession::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let input: &[u8] = b"\xff\xfe bukan teks\nApa judulnya?\n";
        run(&mut assistant, &mut session, input, &mut out, &mut err)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(err).unwrap().trim_end(), BAD_INPUT);
        let texts: Vec<&str> = session.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["Apa judulnya?", "Jawaban dari dokumen."]);
    }
}
