use clap::Parser;

/// Arguments for the completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    pblog completions bash > ~/.bash_completion.d/pblog\n\n\
                  Generate zsh completions:\n    pblog completions zsh > ~/.zfunc/_pblog\n\n\
                  Generate fish completions:\n    pblog completions fish > ~/.config/fish/completions/pblog.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
