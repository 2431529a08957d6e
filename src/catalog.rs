//! Built-in symbol catalog
//!
//! The predefined categories every user starts with. Custom symbols live in
//! [`crate::library`] and are merged with these by [`all_symbols`].

use crate::symbol::{Symbol, CUSTOM_CATEGORY};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Display name shown for the custom category
pub const CUSTOM_CATEGORY_NAME: &str = "Personalizados";

/// A predefined category: (id, name, glyph, spoken text) per symbol
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub symbols: &'static [(&'static str, &'static str, &'static str, &'static str)],
}

impl Category {
    /// Materialize this category's symbols
    pub fn to_symbols(&self) -> Vec<Symbol> {
        self.symbols
            .iter()
            .map(|(id, name, emoji, speech)| {
                Symbol::new(id, name, emoji, self.id).with_speech(speech)
            })
            .collect()
    }
}

/// Predefined categories, in display order
pub static CATEGORIES: &[Category] = &[
    Category {
        id: "emotions",
        name: "Emoções",
        symbols: &[
            ("happy", "Feliz", "😊", "feliz"),
            ("sad", "Triste", "😢", "triste"),
            ("angry", "Nervoso", "😠", "nervoso"),
            ("love", "Amar", "❤️", "amar"),
            ("like", "Gostar", "👍", "gostar"),
            ("dislike", "Não Gostar", "👎", "não gostar"),
            ("scared", "Assustado", "😨", "assustado"),
            ("surprised", "Surpreso", "😲", "surpreso"),
            ("tired", "Cansado", "😩", "cansado"),
            ("sick", "Doente", "🤢", "doente"),
            ("excited", "Animado", "🎉", "animado"),
            ("thinking", "Pensando", "🤔", "pensando"),
            ("shy", "Tímido", "😳", "tímido"),
            ("proud", "Orgulhoso", "🥲", "orgulhoso"),
            ("confused", "Confuso", "😕", "confuso"),
            ("silly", "Bobo", "🤪", "bobo"),
        ],
    },
    Category {
        id: "actions",
        name: "Ações",
        symbols: &[
            ("eat", "Comer", "🍽️", "comer"),
            ("drink", "Beber", "🥤", "beber"),
            ("sleep", "Dormir", "😴", "dormir"),
            ("play", "Brincar", "🎮", "brincar"),
            ("read", "Ler", "📚", "ler"),
            ("write", "Escrever", "✍️", "escrever"),
            ("run", "Correr", "🏃", "correr"),
            ("walk", "Andar", "🚶", "andar"),
            ("wash", "Lavar", "🧼", "lavar"),
            ("go", "Ir", "➡️", "ir"),
            ("come", "Vir", "⬅️", "vir"),
            ("listen", "Ouvir", "👂", "ouvir"),
            ("help", "Ajudar", "🤝", "ajudar"),
            ("wait", "Esperar", "⏳", "esperar"),
            ("look", "Olhar", "👀", "olhar"),
            ("dance", "Dançar", "💃", "dançar"),
            ("sing", "Cantar", "🎤", "cantar"),
            ("open", "Abrir", "🚪", "abrir"),
            ("close", "Fechar", "📕", "fechar"),
        ],
    },
    Category {
        id: "people",
        name: "Pessoas",
        symbols: &[
            ("family", "Família", "👨‍👩‍👧‍👦", "família"),
            ("friend", "Amigo", "👫", "amigo"),
            ("teacher", "Professor", "👨‍🏫", "professor"),
            ("doctor", "Médico", "👨‍⚕️", "médico"),
            ("me", "Eu", "👤", "eu"),
            ("you", "Você", "👉", "você"),
            ("mom", "Mãe", "👩", "mãe"),
            ("dad", "Pai", "👨", "pai"),
            ("brother", "Irmão", "👦", "irmão"),
            ("sister", "Irmã", "👧", "irmã"),
            ("baby", "Bebê", "👶", "bebê"),
            ("grandma", "Avó", "👵", "avó"),
            ("grandpa", "Avô", "👴", "avô"),
            ("police", "Policial", "👮", "policial"),
            ("firefighter", "Bombeiro", "👨‍🚒", "bombeiro"),
        ],
    },
    Category {
        id: "places",
        name: "Lugares",
        symbols: &[
            ("home", "Casa", "🏠", "casa"),
            ("school", "Escola", "🏫", "escola"),
            ("park", "Parque", "🏞️", "parque"),
            ("store", "Loja", "🏪", "loja"),
            ("hospital", "Hospital", "🏥", "hospital"),
            ("beach", "Praia", "🏖️", "praia"),
            ("bathroom", "Banheiro", "🚽", "banheiro"),
            ("kitchen", "Cozinha", "🍳", "cozinha"),
            ("bedroom", "Quarto", "🛏️", "quarto"),
            ("living_room", "Sala", "🛋️", "sala"),
            ("playground", "Parquinho", "🤸", "parquinho"),
            ("restaurant", "Restaurante", "🍔", "restaurante"),
            ("cinema", "Cinema", "🎬", "cinema"),
            ("airport", "Aeroporto", "✈️", "aeroporto"),
            ("farm", "Fazenda", "🚜", "fazenda"),
        ],
    },
    Category {
        id: "objects",
        name: "Objetos",
        symbols: &[
            ("phone", "Telefone", "📱", "telefone"),
            ("book", "Livro", "📖", "livro"),
            ("ball", "Bola", "⚽", "bola"),
            ("food", "Comida", "🍎", "comida"),
            ("water", "Água", "💧", "água"),
            ("toy", "Brinquedo", "🧸", "brinquedo"),
            ("car", "Carro", "🚗", "carro"),
            ("money", "Dinheiro", "💰", "dinheiro"),
            ("clothes", "Roupas", "👕", "roupas"),
            ("shoes", "Sapatos", "👟", "sapatos"),
            ("computer", "Computador", "💻", "computador"),
            ("tv", "TV", "📺", "tv"),
            ("chair", "Cadeira", "🪑", "cadeira"),
            ("bed", "Cama", "🛏️", "cama"),
            ("pencil", "Lápis", "✏️", "lápis"),
            ("paper", "Papel", "📄", "papel"),
            ("backpack", "Mochila", "🎒", "mochila"),
        ],
    },
    Category {
        id: "time",
        name: "Tempo",
        symbols: &[
            ("now", "Agora", "⏰", "agora"),
            ("today", "Hoje", "📅", "hoje"),
            ("tomorrow", "Amanhã", "🌅", "amanhã"),
            ("yesterday", "Ontem", "🌇", "ontem"),
            ("morning", "Manhã", "🌞", "manhã"),
            ("afternoon", "Tarde", "🌤️", "tarde"),
            ("night", "Noite", "🌙", "noite"),
            ("soon", "Logo", "⚡", "logo"),
            ("always", "Sempre", "🔄", "sempre"),
            ("never", "Nunca", "🚫", "nunca"),
            ("sometimes", "Às vezes", "🌗", "às vezes"),
            ("hour", "Hora", "🕒", "hora"),
            ("day", "Dia", "☀️", "dia"),
            ("week", "Semana", "📆", "semana"),
            ("month", "Mês", "🈷️", "mês"),
            ("year", "Ano", "🎇", "ano"),
        ],
    },
    Category {
        id: "food",
        name: "Comidas",
        symbols: &[
            ("apple", "Maçã", "🍎", "maçã"),
            ("banana", "Banana", "🍌", "banana"),
            ("bread", "Pão", "🍞", "pão"),
            ("pizza", "Pizza", "🍕", "pizza"),
            ("milk", "Leite", "🥛", "leite"),
            ("juice", "Suco", "🧃", "suco"),
        ],
    },
    Category {
        id: "animals",
        name: "Animais",
        symbols: &[
            ("dog", "Cachorro", "🐶", "cachorro"),
            ("cat", "Gato", "🐱", "gato"),
            ("bird", "Pássaro", "🐦", "pássaro"),
            ("fish", "Peixe", "🐠", "peixe"),
            ("lion", "Leão", "🦁", "leão"),
            ("cow", "Vaca", "🐮", "vaca"),
        ],
    },
    Category {
        id: "nature",
        name: "Natureza",
        symbols: &[
            ("sun", "Sol", "☀️", "sol"),
            ("moon", "Lua", "🌙", "lua"),
            ("star", "Estrela", "⭐", "estrela"),
            ("rain", "Chuva", "🌧️", "chuva"),
            ("flower", "Flor", "🌸", "flor"),
            ("tree", "Árvore", "🌳", "árvore"),
        ],
    },
];

/// Built-in symbols indexed by id
///
/// Ids are unique across categories, so this is a plain lookup table.
static BY_ID: Lazy<HashMap<&'static str, Symbol>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for category in CATEGORIES {
        for &(id, name, emoji, speech) in category.symbols {
            m.insert(id, Symbol::new(id, name, emoji, category.id).with_speech(speech));
        }
    }
    m
});

/// Look up a built-in symbol by id
pub fn find(id: &str) -> Option<&'static Symbol> {
    BY_ID.get(id)
}

/// Look up a category by id
pub fn category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// Display name for a category id; unknown ids count as custom
pub fn category_name(id: &str) -> &'static str {
    category(id).map(|c| c.name).unwrap_or(CUSTOM_CATEGORY_NAME)
}

/// Built-in symbols followed by the given custom symbols
pub fn all_symbols(custom: &[Symbol]) -> Vec<Symbol> {
    CATEGORIES
        .iter()
        .flat_map(|c| c.to_symbols())
        .chain(custom.iter().cloned())
        .collect()
}

/// Resolve an id against custom symbols first, then the built-ins
pub fn resolve(id: &str, custom: &[Symbol]) -> Option<Symbol> {
    custom
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .or_else(|| find(id).cloned())
}

/// Symbols whose name contains `term`, ignoring case
///
/// A blank term matches everything.
pub fn search<'a>(symbols: &'a [Symbol], term: &str) -> Vec<&'a Symbol> {
    let term = term.trim().to_lowercase();
    symbols
        .iter()
        .filter(|s| term.is_empty() || s.name.to_lowercase().contains(&term))
        .collect()
}

/// Whether a category id names the custom category
pub fn is_custom_category(id: &str) -> bool {
    id == CUSTOM_CATEGORY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(CATEGORIES.len(), 9);
        assert_eq!(CATEGORIES[0].id, "emotions");
        assert_eq!(BY_ID.len(), all_symbols(&[]).len());
    }

    #[test]
    fn test_find() {
        let eat = find("eat").unwrap();
        assert_eq!(eat.name, "Comer");
        assert_eq!(eat.spoken_text(), "comer");
        assert_eq!(eat.category, "actions");
        assert!(!eat.is_custom);
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_category_name() {
        assert_eq!(category_name("people"), "Pessoas");
        assert_eq!(category_name("custom"), CUSTOM_CATEGORY_NAME);
        assert!(is_custom_category("custom"));
    }

    #[test]
    fn test_search() {
        let objects = category("objects").unwrap().to_symbols();
        let found: Vec<_> = search(&objects, "  ÁG").iter().map(|s| s.id.as_str()).collect();
        assert_eq!(found, vec!["water"]);
        assert_eq!(search(&objects, "").len(), objects.len());
        assert!(search(&objects, "xyz").is_empty());
    }

    #[test]
    fn test_resolve_prefers_custom() {
        let mut custom = Symbol::custom("eat", "Lanche", "img");
        custom.category = "custom".into();
        let resolved = resolve("eat", &[custom]).unwrap();
        assert_eq!(resolved.name, "Lanche");
        assert_eq!(resolve("dog", &[]).unwrap().name, "Cachorro");
    }
}
