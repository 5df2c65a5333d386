/*!
 * Running the whole analysis: load, filter, cluster, report.
 */

use crate::{
    cluster::ClusterList,
    dataset::{load_datasets, Dataset},
    report::{CsvSink, GroupCsvSink, KmlSink, Reporter, TextSink},
    settings::AnalysisSettings,
    FireSpotsResult,
};
use log::info;

/**
 * Run the analysis once.
 *
 * Each instrument's table goes through the value filter, then the percentile filter, then the
 * clusterer, and the clusters are sent to every enabled output. Any error ends the run, output
 * files already opened are closed as they go out of scope.
 *
 * #Returns
 * The clusters found for each instrument, in instrument order. Instruments are skipped (no entry)
 * when none of the cluster outputs are turned on.
 */
pub fn run(settings: &AnalysisSettings) -> FireSpotsResult<Vec<ClusterList>> {
    create_output_dirs(settings)?;

    info!("loading all data from {}", settings.input_dir.display());
    let datasets = load_datasets(&settings.input_dir)?;

    let mut results = Vec::with_capacity(datasets.len());
    for (instrument, dataset) in datasets {
        let dataset = filter_dataset(dataset, settings)?;

        if settings.outputs.any_cluster_output() {
            info!("analyzing top rows for {} ({} rows)", instrument, dataset.len());
            let clusters = ClusterList::find(&dataset, &settings.cluster)?;
            report_clusters(&clusters, settings)?;
            results.push(clusters);
        }

        if settings.outputs.save_data {
            let path = settings.saved_data_path(instrument);
            info!("saving {} data to {}", instrument, path.display());
            dataset.save_csv(path)?;
        }
    }

    Ok(results)
}

/// Apply the value filter and then the percentile filter, whichever are configured.
pub fn filter_dataset(dataset: Dataset, settings: &AnalysisSettings) -> FireSpotsResult<Dataset> {
    let mut dataset = dataset;

    if let Some(filter) = &settings.value_filter {
        info!("filtering {} by {}", dataset.instrument(), filter);
        dataset = filter.apply(dataset)?;
    }

    if let Some(filter) = &settings.percentile_filter {
        info!(
            "filtering {} by {} > percentile {}",
            dataset.instrument(),
            filter.column,
            filter.percentile
        );
        dataset = filter.apply(dataset)?;
    }

    Ok(dataset)
}

/// Send clusters to every output turned on in the settings.
pub fn report_clusters(clusters: &ClusterList, settings: &AnalysisSettings) -> FireSpotsResult<()> {
    let outputs = &settings.outputs;
    let instrument = clusters.instrument;
    let mut reporter = Reporter::new();

    if outputs.to_stdout {
        reporter.add_sink(Box::new(TextSink::stdout()));
    }

    if outputs.to_log {
        let path = settings.result_path(instrument, &outputs.log_name);
        info!("writing log to {}", path.display());
        reporter.add_sink(Box::new(TextSink::create(path)?));
    }

    if outputs.to_csv {
        let path = settings.result_path(instrument, &outputs.csv_name);
        info!("writing csv to {}", path.display());
        reporter.add_sink(Box::new(CsvSink::create(path)?));
    }

    if outputs.split_groups {
        reporter.add_sink(Box::new(GroupCsvSink::new(
            settings.results_dir(),
            &settings.group_prefix(instrument),
        )));
    }

    if outputs.to_kml {
        let path = settings.result_path(instrument, &outputs.kml_name);
        info!("writing map to {}", path.display());
        reporter.add_sink(Box::new(KmlSink::create(path)?));
    }

    reporter.report(clusters, &settings.cluster)?;
    reporter.finish()
}

fn create_output_dirs(settings: &AnalysisSettings) -> FireSpotsResult<()> {
    let results = settings.results_dir();
    info!("creating output directory {}", results.display());
    std::fs::create_dir_all(&results)?;
    Ok(())
}
