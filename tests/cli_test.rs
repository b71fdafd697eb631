//! CLI Command Tests
//!
//! Argument parsing, JSON output format, exit codes and the command
//! handlers run against mocked backends with in-memory stores.

// =============================================================================
// CLI Argument Parsing Tests
// =============================================================================

mod cli_parsing {
    use clap::Parser;
    use nitflex::api::Category;
    use nitflex::cli::{Cli, Command, FeedArg, MediaArg, WatchlistAction};

    #[test]
    fn test_feed_command_basic() {
        let cli = Cli::parse_from(["nitflex", "feed", "popular"]);
        match cli.command {
            Command::Feed(cmd) => {
                assert_eq!(cmd.feed, FeedArg::Popular);
                assert_eq!(cmd.media, MediaArg::Movie); // default
                assert_eq!(cmd.page, 1); // default
                assert!(cmd.id.is_none());
            }
            _ => panic!("Expected Feed command"),
        }
    }

    #[test]
    fn test_feed_names() {
        let cases = [
            ("trending", Some(Category::Trending)),
            ("top-rated", Some(Category::TopRated)),
            ("now-playing", Some(Category::NowPlaying)),
            ("upcoming", Some(Category::Upcoming)),
            ("back-in-the-days", Some(Category::BackInTheDays)),
            ("recommended", None),
        ];
        for (name, category) in cases {
            let cli = Cli::parse_from(["nitflex", "feed", name]);
            match cli.command {
                Command::Feed(cmd) => assert_eq!(cmd.feed.category(), category, "{}", name),
                _ => panic!("Expected Feed command"),
            }
        }
    }

    #[test]
    fn test_unknown_feed_rejected() {
        assert!(Cli::try_parse_from(["nitflex", "feed", "latest"]).is_err());
    }

    #[test]
    fn test_search_with_options() {
        let cli = Cli::parse_from(["nitflex", "search", "dune", "--page", "2", "--adult"]);
        match cli.command {
            Command::Search(cmd) => {
                assert_eq!(cmd.query, "dune");
                assert_eq!(cmd.page, 2);
                assert_eq!(cmd.adult_override(), Some(true));
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_register_command() {
        let cli = Cli::parse_from([
            "nitflex",
            "register",
            "--name",
            "Ann",
            "--email",
            "ann@x.io",
            "--password",
            "secret123",
        ]);
        match cli.command {
            Command::Register(cmd) => {
                assert_eq!(cmd.name, "Ann");
                assert_eq!(cmd.email, "ann@x.io");
                assert!(cmd.password_confirmation.is_none());
            }
            _ => panic!("Expected Register command"),
        }
    }

    #[test]
    fn test_login_requires_credentials() {
        assert!(Cli::try_parse_from(["nitflex", "login", "--email", "a@b.c"]).is_err());
    }

    #[test]
    fn test_watchlist_subcommands() {
        let cli = Cli::parse_from(["nitflex", "watchlist", "remove", "42"]);
        match cli.command {
            Command::Watchlist(cmd) => {
                assert!(matches!(cmd.action, WatchlistAction::Remove { id: 42 }))
            }
            _ => panic!("Expected Watchlist command"),
        }

        let cli = Cli::parse_from(["nitflex", "watchlist", "clear"]);
        assert!(matches!(cli.command, Command::Watchlist(_)));
    }

    #[test]
    fn test_command_aliases() {
        let cli = Cli::parse_from(["nitflex", "s", "dune"]);
        assert!(matches!(cli.command, Command::Search(_)));

        let cli = Cli::parse_from(["nitflex", "f", "trending"]);
        assert!(matches!(cli.command, Command::Feed(_)));

        let cli = Cli::parse_from(["nitflex", "wl", "list"]);
        assert!(matches!(cli.command, Command::Watchlist(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["nitflex", "logout", "--json", "-q"]);
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Command::Logout));
    }
}

// =============================================================================
// JSON Output Tests
// =============================================================================

mod json_output {
    use nitflex::cli::{ExitCode, JsonOutput, StatusOk};

    #[test]
    fn test_json_output_success() {
        let output = JsonOutput::success("test data");
        let json = serde_json::to_string(&output).unwrap();

        assert!(json.contains("\"data\":\"test data\""));
        assert!(!json.contains("error"));
        assert!(!json.contains("exit_code")); // Should be omitted when 0
    }

    #[test]
    fn test_json_output_error() {
        let output = JsonOutput::<()>::error_msg("Something went wrong", ExitCode::NetworkError);
        let json = serde_json::to_string(&output).unwrap();

        assert!(json.contains("\"error\":\"Something went wrong\""));
        assert!(json.contains("\"exit_code\":3"));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_status_ok_format() {
        let status = StatusOk::default();
        let json = serde_json::to_string(&status).unwrap();

        assert_eq!(json, r#"{"status":"ok"}"#);
    }
}

// =============================================================================
// Output Helper Tests
// =============================================================================

mod output_helpers {
    use clap::Parser;
    use nitflex::cli::{Cli, ExitCode, Output};

    #[test]
    fn test_output_json_mode() {
        let cli = Cli::parse_from(["nitflex", "--json", "whoami"]);
        let output = Output::new(&cli);
        assert!(output.json);
    }

    #[test]
    fn test_output_quiet_mode() {
        let cli = Cli::parse_from(["nitflex", "--quiet", "whoami"]);
        let output = Output::new(&cli);
        assert!(output.quiet);
    }

    #[test]
    fn test_error_returns_code() {
        let output = Output {
            json: true,
            quiet: true,
        };
        assert_eq!(output.error("boom", ExitCode::AuthError), ExitCode::AuthError);
    }
}

// =============================================================================
// Command Handler Tests
// =============================================================================

mod handlers {
    use mockito::{Matcher, Server};
    use nitflex::app::App;
    use nitflex::cli::{
        ExitCode, FeedArg, FeedCmd, LoginCmd, MediaArg, Output, PrefsCmd, SearchCmd,
        WatchlistAction, WatchlistCmd,
    };
    use nitflex::commands;
    use nitflex::config::Config;

    fn quiet() -> Output {
        Output {
            json: true,
            quiet: true,
        }
    }

    async fn app_for(url: &str) -> App {
        let config = Config {
            tmdb_api_key: Some("test_key".to_string()),
            catalog_base_url: url.to_string(),
            auth_base_url: url.to_string(),
            ..Config::default()
        };
        App::in_memory(config).await.unwrap()
    }

    const EMPTY_PAGE: &str = r#"{"page": 1, "results": [], "total_pages": 1, "total_results": 0}"#;

    #[tokio::test]
    async fn test_feed_cmd_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/tv/top_rated")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(EMPTY_PAGE)
            .create_async()
            .await;

        let app = app_for(&server.url()).await;
        let cmd = FeedCmd {
            feed: FeedArg::TopRated,
            media: MediaArg::Tv,
            page: 2,
            id: None,
        };
        let code = commands::feed_cmd(cmd, &app, &quiet()).await;

        mock.assert_async().await;
        assert_eq!(code, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_feed_cmd_requires_id_for_similar() {
        let server = Server::new_async().await;
        let app = app_for(&server.url()).await;
        let cmd = FeedCmd {
            feed: FeedArg::Similar,
            media: MediaArg::Movie,
            page: 1,
            id: None,
        };
        assert_eq!(
            commands::feed_cmd(cmd, &app, &quiet()).await,
            ExitCode::InvalidArgs
        );
    }

    #[tokio::test]
    async fn test_feed_cmd_rejects_page_zero() {
        let server = Server::new_async().await;
        let app = app_for(&server.url()).await;
        let cmd = FeedCmd {
            feed: FeedArg::Popular,
            media: MediaArg::Movie,
            page: 0,
            id: None,
        };
        assert_eq!(
            commands::feed_cmd(cmd, &app, &quiet()).await,
            ExitCode::InvalidArgs
        );
    }

    #[tokio::test]
    async fn test_feed_cmd_bad_key_is_auth_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/movie/popular")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let app = app_for(&server.url()).await;
        let cmd = FeedCmd {
            feed: FeedArg::Popular,
            media: MediaArg::Movie,
            page: 1,
            id: None,
        };
        assert_eq!(
            commands::feed_cmd(cmd, &app, &quiet()).await,
            ExitCode::AuthError
        );
    }

    #[tokio::test]
    async fn test_search_cmd_blank_query() {
        let server = Server::new_async().await;
        let app = app_for(&server.url()).await;
        let cmd = SearchCmd {
            query: "   ".to_string(),
            page: 1,
            adult: false,
            no_adult: false,
        };
        assert_eq!(
            commands::search_cmd(cmd, &app, &quiet()).await,
            ExitCode::InvalidArgs
        );
    }

    #[tokio::test]
    async fn test_search_cmd_override_does_not_persist() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search/multi")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "dune".into()),
                Matcher::UrlEncoded("include_adult".into(), "false".into()),
            ]))
            .with_status(200)
            .with_body(EMPTY_PAGE)
            .create_async()
            .await;

        let app = app_for(&server.url()).await;
        let cmd = SearchCmd {
            query: "dune".to_string(),
            page: 1,
            adult: false,
            no_adult: true,
        };
        let code = commands::search_cmd(cmd, &app, &quiet()).await;

        mock.assert_async().await;
        assert_eq!(code, ExitCode::Success);
        assert!(app.prefs().include_adult());
    }

    #[tokio::test]
    async fn test_watchlist_cmd_exists_and_clear() {
        let server = Server::new_async().await;
        let app = app_for(&server.url()).await;

        let exists = WatchlistCmd {
            action: WatchlistAction::Exists { id: 7 },
        };
        assert_eq!(
            commands::watchlist_cmd(exists, &app, &quiet()).await,
            ExitCode::Success
        );

        let clear = WatchlistCmd {
            action: WatchlistAction::Clear,
        };
        assert_eq!(
            commands::watchlist_cmd(clear, &app, &quiet()).await,
            ExitCode::Success
        );
    }

    #[tokio::test]
    async fn test_watchlist_cmd_add_looks_up_title() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/movie/414906")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"id": 414906, "title": "The Batman", "release_date": "2022-03-01",
                    "poster_path": "/b.jpg", "vote_average": 7.8}"#,
            )
            .create_async()
            .await;

        let app = app_for(&server.url()).await;
        let add = WatchlistCmd {
            action: WatchlistAction::Add {
                id: 414906,
                media: MediaArg::Movie,
            },
        };
        let code = commands::watchlist_cmd(add, &app, &quiet()).await;

        mock.assert_async().await;
        assert_eq!(code, ExitCode::Success);
        let entries = app.watch_list().list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "The Batman");
        assert_eq!(entries[0].image_path.as_deref(), Some("/b.jpg"));
    }

    #[tokio::test]
    async fn test_login_cmd_rejected_is_auth_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/login")
            .with_status(401)
            .with_body(r#"{"message": "Invalid credentials"}"#)
            .create_async()
            .await;

        let app = app_for(&server.url()).await;
        let cmd = LoginCmd {
            email: "ann@x.io".to_string(),
            password: "wrong".to_string(),
        };
        assert_eq!(
            commands::login_cmd(cmd, &app, &quiet()).await,
            ExitCode::AuthError
        );
        assert!(app.prefs().auth_token().is_none());
    }

    #[tokio::test]
    async fn test_login_then_whoami() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/login")
            .with_status(200)
            .with_body(r#"{"token": "tok-1", "user": {"id": 1, "name": "Ann", "email": "ann@x.io"}}"#)
            .create_async()
            .await;

        let app = app_for(&server.url()).await;
        assert_eq!(commands::whoami_cmd(&app, &quiet()).await, ExitCode::AuthError);

        let cmd = LoginCmd {
            email: "ann@x.io".to_string(),
            password: "secret123".to_string(),
        };
        assert_eq!(commands::login_cmd(cmd, &app, &quiet()).await, ExitCode::Success);
        assert_eq!(app.prefs().user_name().as_deref(), Some("Ann"));
        assert_eq!(commands::whoami_cmd(&app, &quiet()).await, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_prefs_cmd_sets_adult() {
        let server = Server::new_async().await;
        let app = app_for(&server.url()).await;
        assert!(app.prefs().include_adult());

        let cmd = PrefsCmd { adult: Some(false) };
        assert_eq!(commands::prefs_cmd(cmd, &app, &quiet()).await, ExitCode::Success);
        assert!(!app.prefs().include_adult());
    }
}
