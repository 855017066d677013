//! services/api/src/adapters/translations.rs
//!
//! The embedded translation catalog behind the `Translator` port.
//! Missing keys fall back to English, then to the key itself.

use itinerary_planner_core::ports::Translator;

type Table = &'static [(&'static str, &'static str)];

const EN: Table = &[
    ("planner.greeting", "Hi! I'm your local trip planner. I can put together an itinerary for your visit or tell you a little about the town."),
    ("planner.action.create", "Create an itinerary"),
    ("planner.action.learn", "Learn about the town"),
    ("planner.townInfoFallback", "Our town is full of friendly local businesses, great food and plenty to see. Ask me to plan a trip and I'll show you the best of it!"),
    ("planner.askInterests", "Great! What are you interested in? For example: beaches, food, history, hiking."),
    ("planner.askDuration", "How many days will you be staying? (1-10)"),
    ("planner.invalidDuration", "Please enter a valid number of days (1-10)."),
    ("planner.askBudget", "What's your budget for this trip?"),
    ("planner.budget.budgetFriendly", "Budget-friendly"),
    ("planner.budget.moderate", "Moderate"),
    ("planner.budget.luxury", "Luxury"),
    ("planner.generating", "Perfect! Give me a moment while I put together some suggestions..."),
    ("planner.generationFailed", "Sorry, I couldn't create suggestions right now. Let's start over."),
    ("planner.suggestionsReady", "Here are my suggestions. Pick the ones you like and confirm when you're ready."),
    ("planner.confirmSelection", "Create my itinerary"),
    ("planner.itineraryReady", "Here's your personalised itinerary!"),
    ("planner.modifySelections", "Modify selections"),
    ("planner.dayTitle", "Day {{day}}"),
    ("planner.askDelivery", "Would you like me to send you this itinerary?"),
    ("planner.delivery.email", "Send by email"),
    ("planner.delivery.whatsapp", "Send by WhatsApp"),
    ("planner.delivery.none", "No thanks"),
    ("planner.askEmail", "What's your email address?"),
    ("planner.invalidEmail", "That doesn't look like a valid email address. Please try again."),
    ("planner.emailConfirmed", "Done! Your itinerary is on its way to {{contact}}."),
    ("planner.askPhone", "What's your WhatsApp number? Include the country code, e.g. +14155552671."),
    ("planner.invalidPhone", "That doesn't look like a valid phone number. Please try again."),
    ("planner.whatsappConfirmed", "Done! Your itinerary is on its way to {{contact}} on WhatsApp."),
    ("planner.closing", "No problem. Enjoy your trip!"),
    ("planner.startOver", "Start over"),
    ("planner.loading", "Thinking..."),
    ("planner.inputPlaceholder", "Type your answer..."),
    ("planner.itineraryPlaceholder", "Your itinerary will appear here once you've picked your activities."),
];

const ES: Table = &[
    ("planner.greeting", "¡Hola! Soy tu planificador de viajes local. Puedo preparar un itinerario para tu visita o contarte un poco sobre el pueblo."),
    ("planner.action.create", "Crear un itinerario"),
    ("planner.action.learn", "Conocer el pueblo"),
    ("planner.townInfoFallback", "Nuestro pueblo está lleno de negocios locales, buena comida y mucho que ver. ¡Pídeme un plan y te enseñaré lo mejor!"),
    ("planner.askInterests", "¡Genial! ¿Qué te interesa? Por ejemplo: playas, comida, historia, senderismo."),
    ("planner.askDuration", "¿Cuántos días te quedarás? (1-10)"),
    ("planner.invalidDuration", "Introduce un número de días válido (1-10)."),
    ("planner.askBudget", "¿Cuál es tu presupuesto para este viaje?"),
    ("planner.budget.budgetFriendly", "Económico"),
    ("planner.budget.moderate", "Moderado"),
    ("planner.budget.luxury", "De lujo"),
    ("planner.generating", "¡Perfecto! Dame un momento mientras preparo algunas sugerencias..."),
    ("planner.generationFailed", "Lo siento, no he podido crear sugerencias ahora mismo. Empecemos de nuevo."),
    ("planner.suggestionsReady", "Estas son mis sugerencias. Elige las que te gusten y confirma cuando quieras."),
    ("planner.confirmSelection", "Crear mi itinerario"),
    ("planner.itineraryReady", "¡Aquí tienes tu itinerario personalizado!"),
    ("planner.modifySelections", "Modificar selección"),
    ("planner.dayTitle", "Día {{day}}"),
    ("planner.askDelivery", "¿Quieres que te envíe este itinerario?"),
    ("planner.delivery.email", "Enviar por correo"),
    ("planner.delivery.whatsapp", "Enviar por WhatsApp"),
    ("planner.delivery.none", "No, gracias"),
    ("planner.askEmail", "¿Cuál es tu correo electrónico?"),
    ("planner.invalidEmail", "Ese correo no parece válido. Inténtalo de nuevo."),
    ("planner.emailConfirmed", "¡Listo! Tu itinerario va de camino a {{contact}}."),
    ("planner.askPhone", "¿Cuál es tu número de WhatsApp? Incluye el prefijo del país, p. ej. +34600111222."),
    ("planner.invalidPhone", "Ese número no parece válido. Inténtalo de nuevo."),
    ("planner.whatsappConfirmed", "¡Listo! Tu itinerario va de camino a {{contact}} por WhatsApp."),
    ("planner.closing", "¡Sin problema! Disfruta del viaje."),
    ("planner.startOver", "Empezar de nuevo"),
    ("planner.loading", "Pensando..."),
    ("planner.inputPlaceholder", "Escribe tu respuesta..."),
    ("planner.itineraryPlaceholder", "Tu itinerario aparecerá aquí cuando hayas elegido tus actividades."),
];

pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "es"];

/// A `Translator` over one of the embedded language tables.
#[derive(Debug, Clone, Copy)]
pub struct CatalogTranslator {
    language: &'static str,
    table: Table,
}

impl CatalogTranslator {
    /// Picks the table for `language` (`es`, `es-ES`, ...), English when unknown.
    pub fn for_language(language: &str) -> Self {
        let primary = language
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match primary.as_str() {
            "es" => Self { language: "es", table: ES },
            _ => Self { language: "en", table: EN },
        }
    }

    pub fn language(&self) -> &'static str {
        self.language
    }

    fn lookup(table: Table, key: &str) -> Option<&'static str> {
        table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

impl Translator for CatalogTranslator {
    fn t(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        let template = Self::lookup(self.table, key)
            .or_else(|| Self::lookup(EN, key))
            .unwrap_or(key);

        replacements
            .iter()
            .fold(template.to_string(), |text, (name, value)| {
                text.replace(&format!("{{{{{}}}}}", name), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_placeholders() {
        let t = CatalogTranslator::for_language("en");
        assert_eq!(
            t.t("planner.emailConfirmed", &[("contact", "ana@example.com")]),
            "Done! Your itinerary is on its way to ana@example.com."
        );
        assert_eq!(t.t("planner.dayTitle", &[("day", "3")]), "Day 3");
    }

    #[test]
    fn region_tags_pick_the_primary_language() {
        let t = CatalogTranslator::for_language("es-ES");
        assert_eq!(t.language(), "es");
        assert_eq!(t.t("planner.dayTitle", &[("day", "2")]), "Día 2");
    }

    #[test]
    fn missing_keys_fall_back_to_english_then_key() {
        let partial = CatalogTranslator {
            language: "es",
            table: &[("planner.greeting", "¡Hola!")],
        };
        assert_eq!(partial.t("planner.greeting", &[]), "¡Hola!");
        assert_eq!(partial.t("planner.startOver", &[]), "Start over");
        assert_eq!(partial.t("planner.nope", &[]), "planner.nope");
        assert_eq!(CatalogTranslator::for_language("fr").language(), "en");
    }

    #[test]
    fn every_catalog_covers_the_english_keys() {
        for (key, _) in EN {
            assert!(
                CatalogTranslator::lookup(ES, key).is_some(),
                "'{}' has no Spanish entry",
                key
            );
        }
        let t = CatalogTranslator::for_language("es");
        assert_eq!(
            t.t("planner.itineraryPlaceholder", &[]),
            "Tu itinerario aparecerá aquí cuando hayas elegido tus actividades."
        );
    }

    #[test]
    fn duration_correction_mentions_the_range() {
        let t = CatalogTranslator::for_language("en");
        assert!(t.t("planner.invalidDuration", &[]).contains("valid number of days (1-10)"));
    }
}
