#[cfg(test)]
mod tests {
    use crate::cli::{BuildArgs, Cli, Command, InitArgs, WatchArgs};
    use clap::Parser;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_no_arguments_watches() {
        let cli = parse(&["jsxbridge"]);
        assert_eq!(cli.resolve(), Command::Watch(WatchArgs { config: None }));
    }

    #[test]
    fn test_lone_argument_is_watch_config() {
        let cli = parse(&["jsxbridge", "project/jsxbridge.config.json"]);
        assert_eq!(
            cli.resolve(),
            Command::Watch(WatchArgs {
                config: Some(PathBuf::from("project/jsxbridge.config.json")),
            })
        );
    }

    #[test]
    fn test_build_with_config() {
        let cli = parse(&["jsxbridge", "build", "cfg.json"]);
        assert_eq!(
            cli.resolve(),
            Command::Build(BuildArgs {
                config: Some(PathBuf::from("cfg.json")),
            })
        );
    }

    #[test]
    fn test_explicit_watch() {
        let cli = parse(&["jsxbridge", "watch"]);
        assert_eq!(cli.resolve(), Command::Watch(WatchArgs { config: None }));
    }

    #[test]
    fn test_global_flags_before_and_after_subcommand() {
        let cli = parse(&["jsxbridge", "--verbose", "build"]);
        assert!(cli.verbose);
        assert!(matches!(cli.resolve(), Command::Build(_)));

        let cli = parse(&["jsxbridge", "watch", "--no-color"]);
        assert!(cli.no_color);
    }

    #[test]
    fn test_init_and_schema() {
        let cli = parse(&["jsxbridge", "init", "project", "--force"]);
        assert_eq!(
            cli.resolve(),
            Command::Init(InitArgs {
                dir: Some(PathBuf::from("project")),
                force: true,
            })
        );

        let cli = parse(&["jsxbridge", "schema"]);
        assert_eq!(cli.resolve(), Command::Schema);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["jsxbridge", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_command_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
