use super::conversation_state::Message;

pub const SYSTEM_CONTEXT: &str = "Você é um assistente culinário virtual chamado Mega Chef da Computaria. Seu principal objetivo é ajudar as pessoas com receitas e dicas culinárias.

Você deve:
1. Focar principalmente em ajudar com receitas, ingredientes e técnicas culinárias
2. Perguntar sobre restrições alimentares e ingredientes disponíveis
3. Oferecer sugestões de receitas baseadas nos ingredientes que a pessoa tem
4. Dar dicas de preparo e truques culinários
5. Adaptar receitas para diferentes restrições alimentares
6. Sugerir harmonizações de pratos e bebidas
7. Compartilhar dicas para melhorar habilidades culinárias

Sobre o clima e horário:
- Só forneça informações sobre o clima quando o usuário explicitamente perguntar
- Só forneça informações sobre data/hora quando o usuário explicitamente perguntar
- Use as informações do clima para sugerir receitas apropriadas
- Não inicie conversas sobre clima ou horário, foque em culinária

Mantenha um tom amigável e profissional, sempre priorizando o tema culinário.";

/// Holds the fixed system context and flattens history into a single prompt.
pub struct ContextManager {
    system_context: String,
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new(SYSTEM_CONTEXT)
    }
}

impl ContextManager {
    pub fn new(system_context: impl Into<String>) -> Self {
        Self {
            system_context: system_context.into(),
        }
    }

    #[cfg(test)]
    pub fn get_system_context(&self) -> &str {
        &self.system_context
    }

    /// System context, then the labelled transcript (if any), then the new
    /// utterance on the last line.
    pub fn build_prompt(&self, window: &[Message], utterance: &str) -> String {
        let mut transcript = String::new();
        if !window.is_empty() {
            transcript.push_str("Histórico da conversa:\n");
            for message in window {
                transcript.push_str(message.role_label());
                transcript.push_str(": ");
                transcript.push_str(&message.text);
                transcript.push('\n');
            }
        }

        format!(
            "{}\n\n{}\nPergunta atual do usuário: {}",
            self.system_context, transcript, utterance
        )
    }
}
