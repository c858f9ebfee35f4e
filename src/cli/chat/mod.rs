pub mod context;
pub mod conversation_state;
pub mod error;
pub mod history_storage;
pub mod intent;
pub mod lookups;
pub mod network;
pub mod orchestrator;
pub mod prompt;
pub mod services;
pub mod session;

#[cfg(test)]
pub mod testing;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use color_print::cformat;
use crossterm::{cursor, execute, terminal};
use eyre::Result;
use prompt::generate_prompt;
use rustyline::error::ReadlineError;
use tracing::{info, warn};

use conversation_state::{ConversationState, Message};
use error::ChatError;
use history_storage::{FileStorage, HistoryStorage, MemoryStorage};
use intent::CityExtractor;
use lookups::LocationServices;
use network::TcpProbe;
use orchestrator::DialogueOrchestrator;
use session::PendingQuery;

use crate::gemini_client::GeminiClient;
use crate::openweather_client::OpenWeatherClient;
use crate::settings::Settings;

const WELCOME_TEXT: &str = "
Olá! Sou o Mega Chef da Computaria, seu assistente culinário virtual, pronto para te ajudar com:

• Sugestões de receitas com os ingredientes que você tem.
• Dicas de preparo e truques para acertar no prato.
• Adaptações conforme suas restrições ou preferências alimentares.
• Harmonizações entre comidas e bebidas.
• Segredos para melhorar suas habilidades na cozinha.
• Informações sobre o clima para ajudar no planejamento das suas refeições.

Para começar, me conte se tem alguma restrição alimentar ou preferência, e o que tem disponível na sua despensa. Vamos cozinhar juntos... com dados!

/help         Mostrar a ajuda
/quit         Sair
";

const HELP_TEXT: &str = "
Mega Chef da Computaria

/clear        Apagar a conversa (também do disco)
/help         Mostrar esta ajuda
/quit         Sair

Pergunte sobre o clima ou a hora e eu pergunto a sua cidade.
";

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    orchestrator: DialogueOrchestrator,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        orchestrator: DialogueOrchestrator,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            orchestrator,
        }
    }

    /// Wires the real adapters according to `settings`.
    pub fn build_orchestrator(settings: &Settings) -> DialogueOrchestrator {
        let storage: Box<dyn HistoryStorage> = match &settings.history_file {
            Some(path) => {
                info!("Conversation history at {}", path.display());
                Box::new(FileStorage::new(path))
            }
            None => {
                warn!("No data directory available, history will not be persisted");
                Box::new(MemoryStorage::new())
            }
        };

        let network = TcpProbe::for_base_url(&settings.gemini_api_base);
        let mut orchestrator =
            DialogueOrchestrator::new(ConversationState::load(storage), Arc::new(network))
                .with_city_extractor(CityExtractor::new(settings.strict_city_replies));

        match &settings.gemini_api_key {
            Some(key) => {
                let client = GeminiClient::new(
                    key.as_str(),
                    settings.gemini_api_base.as_str(),
                    settings.gemini_model.as_str(),
                );
                match client {
                    Ok(client) => {
                        info!("Using Gemini model {}", client.model());
                        orchestrator = orchestrator.with_language_model(Arc::new(client));
                    }
                    Err(e) => warn!("Failed to initialize Gemini client: {}", e),
                }
            }
            None => warn!("GEMINI_API_KEY not set, general questions will fail"),
        }

        match &settings.openweather_api_key {
            Some(key) if settings.location_available() => {
                let client =
                    OpenWeatherClient::new(key.as_str(), settings.openweather_api_base.as_str());
                orchestrator = orchestrator.with_location(LocationServices::new(Arc::new(client)));
            }
            _ => info!("Weather and time answers disabled"),
        }

        orchestrator
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        if self.interactive {
            self.print_conversation()?;
        }

        // Handle non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            let ok = self.handle_input(&input).await?;
            return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }

        if self.interactive {
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    /// Restored history, or the welcome text for a fresh conversation.
    fn print_conversation(&mut self) -> Result<()> {
        if self.orchestrator.messages().is_empty() {
            writeln!(self.output, "{}", WELCOME_TEXT)?;
            return Ok(());
        }

        let messages = self.orchestrator.messages().to_vec();
        for message in &messages {
            self.print_message(message)?;
        }
        Ok(())
    }

    fn print_message(&mut self, message: &Message) -> Result<()> {
        let line = if message.is_user {
            cformat!("<cyan,bold>Você:</> {}", message.text)
        } else {
            cformat!("<green,bold>Mega Chef:</> {}", message.text)
        };
        writeln!(self.output, "{}\n", line)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let pending = self.orchestrator.session().pending() != PendingQuery::Idle;
            let readline = rl.readline(&generate_prompt(pending));

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    self.handle_input(&line).await?;
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Returns `false` when the turn ended with a visible error.
    async fn handle_input(&mut self, input: &str) -> Result<bool> {
        match input.trim() {
            "/help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            "/clear" => {
                self.orchestrator.clear();
                if self.interactive {
                    execute!(
                        self.output,
                        terminal::Clear(terminal::ClearType::All),
                        cursor::MoveTo(0, 0)
                    )?;
                }
                writeln!(self.output, "Conversa apagada.")?;
            }
            _ => return self.process_chat_input(input).await,
        }

        Ok(true)
    }

    async fn process_chat_input(&mut self, input: &str) -> Result<bool> {
        match self.orchestrator.handle_user_message(input).await {
            Ok(reply) => {
                let line = cformat!("<green,bold>Mega Chef:</> {}", reply);
                writeln!(self.output, "{}\n", line)?;
                Ok(true)
            }
            Err(ChatError::EmptyMessage) => Ok(true),
            Err(_) => {
                let visible = self.orchestrator.last_error().unwrap_or_default();
                let line = cformat!("<red,bold>⚠</> <red>{}</>", visible);
                writeln!(self.output, "{}\n", line)?;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;
    use super::testing::{FakeModel, FakeWeather, FixedNetwork};
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn orchestrator() -> DialogueOrchestrator {
        let state = ConversationState::load(Box::new(MemoryStorage::new()));
        DialogueOrchestrator::new(state, Arc::new(FixedNetwork(true)))
            .with_language_model(Arc::new(FakeModel::default()))
            .with_location(LocationServices::new(Arc::new(FakeWeather::default())))
    }

    fn context(input: Option<&str>, interactive: bool) -> (ChatContext, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let ctx = ChatContext::new(
            Box::new(buffer.clone()),
            input.map(str::to_string),
            interactive,
            orchestrator(),
        );
        (ctx, buffer)
    }

    #[tokio::test]
    async fn test_single_input_prints_reply() {
        let (mut ctx, buffer) = context(Some("Tenho arroz e feijão"), false);

        let code = ctx.run().await.unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(buffer.text().contains("Que tal um bolo de fubá?"));
    }

    #[tokio::test]
    async fn test_single_input_asks_for_city() {
        let (mut ctx, buffer) = context(Some("vai fazer sol hoje?"), false);

        ctx.run().await.unwrap();

        assert!(buffer.text().contains("em qual cidade você mora"));
    }

    #[tokio::test]
    async fn test_help_command() {
        let (mut ctx, buffer) = context(None, false);

        assert!(ctx.handle_input("/help").await.unwrap());
        assert!(buffer.text().contains("/clear"));
    }

    #[tokio::test]
    async fn test_clear_command() {
        let (mut ctx, buffer) = context(None, false);
        ctx.handle_input("Oi").await.unwrap();

        ctx.handle_input("/clear").await.unwrap();

        assert!(ctx.orchestrator.messages().is_empty());
        assert!(buffer.text().contains("Conversa apagada."));
    }

    #[tokio::test]
    async fn test_error_is_printed_and_reported() {
        let state = ConversationState::load(Box::new(MemoryStorage::new()));
        let offline = DialogueOrchestrator::new(state, Arc::new(FixedNetwork(false)));
        let buffer = SharedBuffer::default();
        let mut ctx = ChatContext::new(Box::new(buffer.clone()), Some("Oi".into()), false, offline);

        let code = ctx.run().await.unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(buffer.text().contains("offline"));
    }

    #[test]
    fn test_welcome_on_empty_history() {
        let (mut ctx, buffer) = context(None, true);
        ctx.print_conversation().unwrap();
        assert!(buffer.text().contains("Mega Chef da Computaria"));
    }

    #[test]
    fn test_restored_history_is_printed() {
        let storage = MemoryStorage::with_contents(
            r#"[{"text":"Tenho ovos","isUser":true},{"text":"Faça uma omelete","isUser":false}]"#,
        );
        let state = ConversationState::load(Box::new(storage));
        let buffer = SharedBuffer::default();
        let mut ctx = ChatContext::new(
            Box::new(buffer.clone()),
            None,
            true,
            DialogueOrchestrator::new(state, Arc::new(FixedNetwork(true))),
        );

        ctx.print_conversation().unwrap();

        let text = buffer.text();
        assert!(text.contains("Tenho ovos"));
        assert!(text.contains("Faça uma omelete"));
        assert!(!text.contains("Vamos cozinhar juntos"));
    }

    #[tokio::test]
    async fn test_lookup_error_line_names_the_city() {
        let weather = FakeWeather {
            unknown: vec!["Atlantis"],
            ..FakeWeather::default()
        };
        let state = ConversationState::load(Box::new(MemoryStorage::new()));
        let orchestrator = DialogueOrchestrator::new(state, Arc::new(FixedNetwork(true)))
            .with_location(LocationServices::new(Arc::new(weather)));
        let buffer = SharedBuffer::default();
        let mut ctx = ChatContext::new(Box::new(buffer.clone()), None, false, orchestrator);

        ctx.handle_input("clima").await.unwrap();
        let ok = ctx.handle_input("Atlantis").await.unwrap();

        assert!(!ok);
        let expected = ctx.orchestrator.last_error().unwrap().to_string();
        assert!(expected.contains("Atlantis"));
        assert!(buffer.text().contains(&expected));
    }

    #[tokio::test]
    async fn test_build_orchestrator_checks_configured_gemini_host() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let settings = Settings {
            gemini_api_base: format!("http://{}", listener.local_addr().unwrap()),
            history_file: Some(dir.path().join("history.json")),
            ..Settings::default()
        };

        let mut orchestrator = ChatContext::build_orchestrator(&settings);
        let err = orchestrator.handle_user_message("Oi").await.unwrap_err();

        // Reachable host, but no key: the model is missing, not the network.
        assert_eq!(err, ChatError::ModelUnavailable);
    }

    #[test]
    fn test_build_orchestrator_without_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = Settings {
            history_file: Some(dir.path().join("history.json")),
            ..Settings::default()
        };

        let orchestrator = ChatContext::build_orchestrator(&settings);
        assert!(orchestrator.messages().is_empty());
    }
}
