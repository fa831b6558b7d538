use clap::{Arg, Command};
use phonotate::{
    Accent, DictionarySource, Element, FileFetcher, Language, ModifierKey, Node,
    PronunciationLookup, Settings, TriggerController,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let matches = Command::new("phonotate")
        .version("0.1.0")
        .about("Annotate text with phonetic transcriptions")
        .arg(
            Arg::new("text")
                .help("Text to annotate")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .short('d')
                .help("Directory holding the per-language dictionary files")
                .default_value("data"),
        )
        .arg(
            Arg::new("accent")
                .long("accent")
                .short('a')
                .help("English accent (us or uk)")
                .default_value("us"),
        )
        .arg(
            Arg::new("hover")
                .long("hover")
                .help("Use per-character hover mode instead of whole-text annotation")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("color")
                .long("color")
                .short('c')
                .help("Render per-phoneme coloring in the output markup")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("disable")
                .long("disable")
                .help("Disable a language (english, chinese, japanese, korean); repeatable")
                .action(clap::ArgAction::Append),
        )
        .get_matches();

    let text = matches.get_one::<String>("text").unwrap();
    let data_dir = matches.get_one::<String>("data-dir").unwrap();
    let accent_tag = matches.get_one::<String>("accent").unwrap();
    let hover = matches.get_flag("hover");

    let mut settings = Settings::default();
    settings.accent.english = Accent::from_tag(accent_tag);
    settings.enable_phonetic_color = matches.get_flag("color");
    if let Some(disabled) = matches.get_many::<String>("disable") {
        for tag in disabled {
            match Language::from_tag(tag) {
                Language::Unknown => {
                    eprintln!("unknown language '{}', ignoring", tag);
                }
                language => settings.set_language_enabled(language, false),
            }
        }
    }

    let sources = vec![
        DictionarySource::AccentMap {
            path: "en/data.json".to_string(),
        },
        DictionarySource::PrefixTree {
            language: Language::Chinese,
            path: "cn/data.json".to_string(),
        },
        DictionarySource::Flat {
            language: Language::Japanese,
            path: "ja/data.json".to_string(),
        },
        DictionarySource::Flat {
            language: Language::Korean,
            path: "ko/data.json".to_string(),
        },
    ];

    let fetcher = FileFetcher::new(data_dir);
    let mut controller = TriggerController::new(PronunciationLookup::new(), settings.clone());
    let report = controller.load_dictionaries(&fetcher, &sources).await;
    for language in &report.loaded {
        eprintln!("loaded {} dictionary", language);
    }
    for (language, error) in &report.failed {
        eprintln!("{} dictionary unavailable: {}", language, error);
    }

    let mut node = Node::Element(Element::new("p").with_text(text));
    if hover {
        let outcome = controller.handle_hover(ModifierKey::Alt, &mut node);
        eprintln!("hover outcome: {:?}", outcome);
    } else {
        let annotated = controller.apply_settings(&mut node, settings);
        eprintln!("annotated {} element(s)", annotated);
    }

    println!("{}", node);
    Ok(())
}
