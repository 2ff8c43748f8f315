
mod test_angle_basic;
mod test_closest_point_basic;
mod test_trace_basic;
