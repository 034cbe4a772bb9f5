//! Full fetch → configure → build → resolve runs.

use httpmock::prelude::*;
use otsprep_lib::pipeline::{Pipeline, PipelineError, PipelineOptions};
use otsprep_lib::resolve::ArtifactResolver;

use super::common::{Release, TestEnv};

#[tokio::test]
async fn provisioning_produces_a_complete_link_set() {
  let server = MockServer::start_async().await;
  let release = Release::new("9.2.0");
  let (mock, digest) = release.serve(&server).await;
  let env = TestEnv::new(&server, 0);

  let pipeline = Pipeline::new(env.config.clone()).unwrap();
  let spec = pipeline.release(release.version, &digest).unwrap();
  let ctx = pipeline.run(spec, &PipelineOptions::default()).await.unwrap();

  mock.assert_hits_async(1).await;
  let set = ctx.link_set.unwrap();
  assert!(set.missing_paths().is_empty(), "missing: {:?}", set.missing_paths());

  let names: Vec<String> = set
    .libraries
    .iter()
    .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
    .collect();
  assert_eq!(
    names,
    ["libots.a", "libbrotli_decoder.a", "libbrotli_common.a", "liblz4.a"]
  );

  let patched = std::fs::read_to_string(env.config.source_dir().join("meson.build")).unwrap();
  assert!(patched.contains("'b_staticpic=True'"));
  assert!(!patched.contains("ots-sanitize"));

  let checked = ArtifactResolver::resolve_checked(&env.config.build_dir, &env.config.source_dir()).unwrap();
  assert_eq!(checked, set);
}

#[tokio::test]
async fn second_run_reuses_tree_and_configuration() {
  let server = MockServer::start_async().await;
  let release = Release::new("9.2.0");
  let (mock, digest) = release.serve(&server).await;
  let env = TestEnv::new(&server, 0);

  for _ in 0..2 {
    let pipeline = Pipeline::new(env.config.clone()).unwrap();
    let spec = pipeline.release(release.version, &digest).unwrap();
    pipeline.run(spec, &PipelineOptions::default()).await.unwrap();
  }

  mock.assert_hits_async(1).await;
  let log = env.tool_log();
  assert_eq!(log.iter().filter(|l| l.starts_with("meson")).count(), 1);
  assert_eq!(log.iter().filter(|l| l.starts_with("ninja")).count(), 2);
}

#[tokio::test]
async fn clean_run_downloads_again() {
  let server = MockServer::start_async().await;
  let release = Release::new("9.2.0");
  let (mock, digest) = release.serve(&server).await;
  let env = TestEnv::new(&server, 0);

  for clean in [false, true] {
    let pipeline = Pipeline::new(env.config.clone()).unwrap();
    let spec = pipeline.release(release.version, &digest).unwrap();
    let options = PipelineOptions {
      clean,
      ..PipelineOptions::default()
    };
    pipeline.run(spec, &options).await.unwrap();
  }

  mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn newer_subproject_versions_are_picked_up() {
  let server = MockServer::start_async().await;
  let release = Release {
    brotli: "1.2.0",
    lz4: "1.10.0",
    woff2: "1.1.0",
    ..Release::new("9.3.0")
  };
  let (_mock, digest) = release.serve(&server).await;
  let env = TestEnv::new(&server, 0);

  let pipeline = Pipeline::new(env.config.clone()).unwrap();
  let spec = pipeline.release(release.version, &digest).unwrap();
  let set = pipeline
    .run(spec, &PipelineOptions::default())
    .await
    .unwrap()
    .link_set
    .unwrap();

  assert!(set.missing_paths().is_empty());
  assert!(set.libraries[1].to_string_lossy().contains("brotli-1.2.0"));
  assert!(set.libraries[3].to_string_lossy().contains("lz4-1.10.0"));
  assert!(set.include_dirs[4].to_string_lossy().contains("woff2-1.1.0"));
}

#[tokio::test]
async fn failed_build_stops_the_pipeline_with_tool_exit_code() {
  let server = MockServer::start_async().await;
  let release = Release::new("9.2.0");
  let (_mock, digest) = release.serve(&server).await;
  let env = TestEnv::new(&server, 5);

  let pipeline = Pipeline::new(env.config.clone()).unwrap();
  let spec = pipeline.release(release.version, &digest).unwrap();
  let err = pipeline.run(spec, &PipelineOptions::default()).await.unwrap_err();

  assert!(matches!(err, PipelineError::Build(_)));
  assert_eq!(err.exit_code(), 5);
}

#[tokio::test]
async fn wrong_digest_leaves_nothing_behind() {
  let server = MockServer::start_async().await;
  let release = Release::new("9.2.0");
  let (_mock, _digest) = release.serve(&server).await;
  let env = TestEnv::new(&server, 0);

  let pipeline = Pipeline::new(env.config.clone()).unwrap();
  let spec = pipeline.release(release.version, &"f".repeat(64)).unwrap();
  let err = pipeline.run(spec, &PipelineOptions::default()).await.unwrap_err();

  assert!(matches!(err, PipelineError::Fetch(_)));
  assert!(!env.config.source_dir().exists());
  assert!(env.tool_log().is_empty());
}
