//! Static HTML chart page for the counts report.
//!
//! The aggregated matrix is embedded as inline JSON and rendered client
//! side with Chart.js. Pure presentation; callers treat a failure to write
//! the page as a warning, never as a run failure.

use crate::monthly_counts::DeviceCountMatrix;
use serde::Serialize;

#[derive(Serialize)]
struct Series {
    name: String,
    data: Vec<u64>,
}

/// Render the interactive chart page for the total and filtered matrices.
/// Both matrices share device rows and month columns.
pub fn render_counts_page(
    total: &DeviceCountMatrix,
    filtered: &DeviceCountMatrix,
    excluded_attack_names: &[String],
) -> String {
    let devices: Vec<String> = total.devices().map(str::to_string).collect();
    let months: Vec<String> = total.months.iter().map(|m| m.file_label()).collect();
    let total_series = to_series(total);
    let filtered_series = to_series(filtered);
    let colors = device_colors(devices.len());

    let period = match (months.first(), months.last()) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => String::new(),
    };
    let generated = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Attacks Count Report</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/chartjs-plugin-datalabels@2"></script>
    <style>
{PAGE_CSS}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>Attacks Count Report</h1>
            <div class="meta">
                <span>Period: {period}</span>
                <span>Generated: {generated}</span>
            </div>
        </header>

        <section class="controls">
            <h3>Display Options</h3>
            <div class="device-row">
                <strong>Devices to show:</strong>
                <button onclick="setAllDevices(true)">Select All</button>
                <button onclick="setAllDevices(false)">Deselect All</button>
            </div>
            <div class="device-row" id="deviceCheckboxes"></div>
            <div class="stack-row">
                <strong>Chart type:</strong>
                <label><input type="radio" name="stackType" value="unstacked" checked> Side by side</label>
                <label><input type="radio" name="stackType" value="stacked"> Stacked</label>
            </div>
        </section>

        <section class="chart-section">
            <div class="chart-container"><canvas id="totalChart"></canvas></div>
        </section>

        <section class="chart-section">
"#,
    );

    if !excluded_attack_names.is_empty() {
        html.push_str(&format!(
            r#"            <div class="excluded-note">Excludes attacks of type: {}</div>
"#,
            escape_html(&excluded_attack_names.join(", "))
        ));
    }

    html.push_str(&format!(
        r#"            <div class="chart-container"><canvas id="filteredChart"></canvas></div>
        </section>
    </div>

    <script>
        const devices = {devices};
        const months = {months};
        const totalData = {total_data};
        const filteredData = {filtered_data};
        const colors = {colors};
        const totalChartMax = {total_max};
        const filteredChartMax = {filtered_max};
{PAGE_JS}
    </script>
</body>
</html>
"#,
        devices = inline_json(&devices),
        months = inline_json(&months),
        total_data = inline_json(&total_series),
        filtered_data = inline_json(&filtered_series),
        colors = inline_json(&colors),
        total_max = chart_max(&total_series),
        filtered_max = chart_max(&filtered_series),
    ));

    html
}

fn to_series(matrix: &DeviceCountMatrix) -> Vec<Series> {
    matrix
        .rows
        .iter()
        .map(|(device, counts)| Series {
            name: device.clone(),
            data: counts.clone(),
        })
        .collect()
}

/// Y-axis ceiling with 15% headroom above the tallest bar.
fn chart_max(series: &[Series]) -> u64 {
    let max = series
        .iter()
        .flat_map(|s| s.data.iter().copied())
        .max()
        .unwrap_or(0);
    (max as f64 * 1.15) as u64
}

/// Blue-to-red ramp, one color per device in row order.
fn device_colors(count: usize) -> Vec<String> {
    const BLUE: (u32, u32, u32) = (0x00, 0x66, 0xCC);
    const RED: (u32, u32, u32) = (0xCC, 0x00, 0x00);
    match count {
        0 => Vec::new(),
        1 => vec!["#0066CC".to_string()],
        n => (0..n)
            .map(|i| {
                let ratio = i as f64 / (n - 1) as f64;
                let lerp = |a: u32, b: u32| (a as f64 + (b as f64 - a as f64) * ratio) as u32;
                format!(
                    "#{:02X}{:02X}{:02X}",
                    lerp(BLUE.0, RED.0),
                    lerp(BLUE.1, RED.1),
                    lerp(BLUE.2, RED.2)
                )
            })
            .collect(),
    }
}

fn inline_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

const PAGE_CSS: &str = r#"        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f5f5f5; padding: 1.5rem; }
        .container { max-width: 1400px; margin: 0 auto; background: #fff; padding: 1.5rem; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        header { text-align: center; padding: 1.25rem; margin-bottom: 1.5rem; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: #fff; border-radius: 10px; }
        h1 { font-size: 1.75rem; margin-bottom: 0.5rem; }
        .meta { font-size: 0.9rem; }
        .meta span { margin: 0 0.75rem; }
        .controls { margin: 1rem 0; padding: 1rem; background: #f8f9fa; border: 1px solid #dee2e6; border-radius: 5px; }
        .controls h3 { margin-bottom: 0.75rem; color: #495057; }
        .device-row { display: flex; flex-wrap: wrap; gap: 0.75rem; align-items: center; margin: 0.5rem 0; }
        .device-row button { padding: 0.25rem 0.6rem; background: #007bff; color: #fff; border: none; border-radius: 3px; cursor: pointer; }
        .device-row button:last-child { background: #6c757d; }
        .device-row label { cursor: pointer; font-weight: 500; }
        .stack-row { display: flex; gap: 1rem; margin-top: 0.75rem; }
        .chart-section { margin: 1.5rem 0; padding: 1rem; background: #fff; border-radius: 10px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }
        .chart-container { position: relative; height: 450px; }
        .excluded-note { background: #fff3cd; border: 1px solid #ffeaa7; border-radius: 5px; padding: 0.6rem; margin-bottom: 0.75rem; font-style: italic; color: #856404; }
"#;

const PAGE_JS: &str = r#"
        let totalChart, filteredChart;

        function makeChart(canvasId, data, label, chartMax) {
            const ctx = document.getElementById(canvasId).getContext('2d');
            return new Chart(ctx, {
                type: 'bar',
                plugins: [ChartDataLabels],
                data: {
                    labels: months,
                    datasets: data.map((series, i) => ({
                        label: series.name,
                        data: series.data,
                        backgroundColor: colors[i] + '80',
                        borderColor: colors[i],
                        borderWidth: 2,
                        hidden: false
                    }))
                },
                options: {
                    responsive: true,
                    maintainAspectRatio: false,
                    interaction: { mode: 'index', intersect: false },
                    plugins: {
                        title: { display: true, text: label, font: { size: 18, weight: 'bold' }, padding: 20 },
                        legend: { display: true, position: 'top' },
                        tooltip: {
                            callbacks: {
                                label: (c) => c.dataset.label + ': ' + c.parsed.y.toLocaleString() + ' attacks'
                            }
                        },
                        datalabels: {
                            align: 'top', anchor: 'end', offset: 8,
                            color: (c) => c.dataset.borderColor,
                            formatter: (value, c) => {
                                if (c.dataset.hidden || value === 0) return '';
                                if (c.chart.options.scales.y.stacked) return '';
                                return value >= 1000000 ? (value / 1000000).toFixed(1) + 'M' : value.toLocaleString();
                            }
                        }
                    },
                    scales: {
                        x: { title: { display: true, text: 'Month' } },
                        y: {
                            beginAtZero: true,
                            max: chartMax > 0 ? chartMax : undefined,
                            title: { display: true, text: 'Number of Attacks' },
                            ticks: {
                                callback: function (value, index, ticks) {
                                    return index === ticks.length - 1 ? '' : value.toLocaleString();
                                }
                            }
                        }
                    }
                }
            });
        }

        function buildCheckboxes() {
            const container = document.getElementById('deviceCheckboxes');
            devices.forEach((device, i) => {
                const label = document.createElement('label');
                label.style.color = colors[i];
                const box = document.createElement('input');
                box.type = 'checkbox';
                box.checked = true;
                box.addEventListener('change', () => toggleDevice(i, box.checked));
                label.appendChild(box);
                label.appendChild(document.createTextNode(' ■ ' + device));
                container.appendChild(label);
            });
        }

        function toggleDevice(i, visible) {
            for (const chart of [totalChart, filteredChart]) {
                chart.data.datasets[i].hidden = !visible;
                chart.update('none');
            }
        }

        function setAllDevices(visible) {
            document.querySelectorAll('#deviceCheckboxes input').forEach((box, i) => {
                box.checked = visible;
                totalChart.data.datasets[i].hidden = !visible;
                filteredChart.data.datasets[i].hidden = !visible;
            });
            totalChart.update('none');
            filteredChart.update('none');
        }

        function setStacking(stacked) {
            for (const chart of [totalChart, filteredChart]) {
                chart.options.scales.x.stacked = stacked;
                chart.options.scales.y.stacked = stacked;
                chart.update();
            }
        }

        document.addEventListener('DOMContentLoaded', () => {
            buildCheckboxes();
            totalChart = makeChart('totalChart', totalData, 'Total Attacks Count', totalChartMax);
            filteredChart = makeChart('filteredChart', filteredData, 'Filtered Attacks Count', filteredChartMax);
            document.querySelectorAll('input[name="stackType"]').forEach((radio) => {
                radio.addEventListener('change', () => setStacking(radio.value === 'stacked'));
            });
        });
"#;
